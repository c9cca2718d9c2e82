//! Numeric matrix backends for coefficient bundles.
//!
//! Every backend implements [`CoefficientStorage`], the small capability set the
//! extractor and the serializers need: allocate, write an element, read an
//! element, and enumerate non-zero entries in row-major order.

use nalgebra::DMatrix;
use std::fmt;

/// Matrix representation requested for extracted coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// `nalgebra::DMatrix<f64>`
    #[default]
    Dense,
    /// Row-wise list-of-lists sparse matrix
    SparseLil,
    /// `nalgebra_sparse::CooMatrix<f64>` (feature `sparse`)
    SparseNative,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Dense => "dense",
            Backend::SparseLil => "sparse_lil",
            Backend::SparseNative => "sparse_native",
        }
    }

    /// Whether this build can produce matrices for the backend.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Dense | Backend::SparseLil => true,
            Backend::SparseNative => cfg!(feature = "sparse"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities a numeric matrix needs to hold LMI coefficients.
pub trait CoefficientStorage: Clone + fmt::Debug {
    const BACKEND: Backend;

    fn zeros(rows: usize, cols: usize) -> Self;

    fn set(&mut self, row: usize, col: usize, value: f64);

    /// Write a cell that has not been set since [`zeros`](Self::zeros).
    fn set_fresh(&mut self, row: usize, col: usize, value: f64) {
        self.set(row, col, value);
    }

    fn get(&self, row: usize, col: usize) -> f64;

    fn shape(&self) -> (usize, usize);

    /// Non-zero entries as `(row, col, value)`, sorted row-major.
    fn nonzero_entries(&self) -> Vec<(usize, usize, f64)>;

    fn to_dense(&self) -> DMatrix<f64> {
        let (rows, cols) = self.shape();
        let mut dense = DMatrix::zeros(rows, cols);
        for (row, col, value) in self.nonzero_entries() {
            dense[(row, col)] = value;
        }
        dense
    }
}

impl CoefficientStorage for DMatrix<f64> {
    const BACKEND: Backend = Backend::Dense;

    fn zeros(rows: usize, cols: usize) -> Self {
        DMatrix::zeros(rows, cols)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self[(row, col)] = value;
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self[(row, col)]
    }

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn nonzero_entries(&self) -> Vec<(usize, usize, f64)> {
        let mut entries = Vec::new();
        for row in 0..self.nrows() {
            for col in 0..self.ncols() {
                let value = self[(row, col)];
                if value != 0.0 {
                    entries.push((row, col, value));
                }
            }
        }
        entries
    }

    fn to_dense(&self) -> DMatrix<f64> {
        self.clone()
    }
}

/// Sparse matrix stored as one sorted `(col, value)` list per row.
///
/// Zero values are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LilMatrix {
    rows: Vec<Vec<(usize, f64)>>,
    cols: usize,
}

impl LilMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![Vec::new(); rows],
            cols,
        }
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Stored entries of one row, sorted by column.
    pub fn row(&self, row: usize) -> &[(usize, f64)] {
        &self.rows[row]
    }

    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows.len() && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows.len(),
            self.cols
        );
    }
}

impl CoefficientStorage for LilMatrix {
    const BACKEND: Backend = Backend::SparseLil;

    fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.check_bounds(row, col);
        let entries = &mut self.rows[row];
        match entries.binary_search_by_key(&col, |(c, _)| *c) {
            Ok(pos) if value == 0.0 => {
                entries.remove(pos);
            }
            Ok(pos) => entries[pos].1 = value,
            Err(_) if value == 0.0 => {}
            Err(pos) => entries.insert(pos, (col, value)),
        }
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.check_bounds(row, col);
        let entries = &self.rows[row];
        entries
            .binary_search_by_key(&col, |(c, _)| *c)
            .map(|pos| entries[pos].1)
            .unwrap_or(0.0)
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    fn nonzero_entries(&self) -> Vec<(usize, usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, entries)| entries.iter().map(move |(col, value)| (row, *col, *value)))
            .collect()
    }
}

#[cfg(feature = "sparse")]
mod native {
    use super::{Backend, CoefficientStorage};
    use nalgebra_sparse::CooMatrix;
    use std::collections::BTreeMap;

    // Coordinate storage sums duplicate triplets. Fresh cells are appended;
    // an overwrite drops the cell's triplets and pushes the new value.
    impl CoefficientStorage for CooMatrix<f64> {
        const BACKEND: Backend = Backend::SparseNative;

        fn zeros(rows: usize, cols: usize) -> Self {
            CooMatrix::new(rows, cols)
        }

        fn set(&mut self, row: usize, col: usize, value: f64) {
            let mut rebuilt = CooMatrix::new(self.nrows(), self.ncols());
            for (r, c, v) in self.triplet_iter() {
                if (r, c) != (row, col) {
                    rebuilt.push(r, c, *v);
                }
            }
            if value != 0.0 {
                rebuilt.push(row, col, value);
            }
            *self = rebuilt;
        }

        fn set_fresh(&mut self, row: usize, col: usize, value: f64) {
            if value != 0.0 {
                self.push(row, col, value);
            }
        }

        fn get(&self, row: usize, col: usize) -> f64 {
            self.triplet_iter()
                .filter(|(r, c, _)| *r == row && *c == col)
                .map(|(_, _, value)| *value)
                .sum()
        }

        fn shape(&self) -> (usize, usize) {
            (self.nrows(), self.ncols())
        }

        fn nonzero_entries(&self) -> Vec<(usize, usize, f64)> {
            let mut merged: BTreeMap<(usize, usize), f64> = BTreeMap::new();
            for (row, col, value) in self.triplet_iter() {
                *merged.entry((row, col)).or_insert(0.0) += *value;
            }
            merged
                .into_iter()
                .filter(|(_, value)| *value != 0.0)
                .map(|((row, col), value)| (row, col, value))
                .collect()
        }
    }
}
