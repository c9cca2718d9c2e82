//! Symbolic matrices: a row-major grid of expressions.

use crate::error::MatrixError;
use crate::expr::Expr;
use crate::symbol::Symbol;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct SymMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<Expr>,
}

impl SymMatrix {
    // ── Constructors ────────────────────────────────────────

    /// Matrix of literal zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![Expr::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| Expr::constant(if i == j { 1.0 } else { 0.0 }))
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Expr) -> Self {
        let mut entries = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                entries.push(f(i, j));
            }
        }
        Self {
            rows,
            cols,
            entries,
        }
    }

    /// Build from rows of anything convertible to an expression.
    ///
    /// Returns an error if the rows do not all have the same length.
    pub fn from_rows<R, E>(rows: impl IntoIterator<Item = R>) -> Result<Self, MatrixError>
    where
        R: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let mut entries = Vec::new();
        let mut cols = None;
        let mut row_count = 0;
        for (row_idx, row) in rows.into_iter().enumerate() {
            let before = entries.len();
            entries.extend(row.into_iter().map(Into::into));
            let found = entries.len() - before;
            match cols {
                None => cols = Some(found),
                Some(expected) if expected != found => {
                    return Err(MatrixError::RaggedRows {
                        row: row_idx,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            row_count += 1;
        }
        Ok(Self {
            rows: row_count,
            cols: cols.unwrap_or(0),
            entries,
        })
    }

    /// Square matrix with the given diagonal and zeros elsewhere.
    pub fn from_diagonal<E: Into<Expr>>(diagonal: impl IntoIterator<Item = E>) -> Self {
        let diagonal: Vec<Expr> = diagonal.into_iter().map(Into::into).collect();
        let n = diagonal.len();
        let mut out = Self::zeros(n, n);
        for (i, value) in diagonal.into_iter().enumerate() {
            out.entries[i * n + i] = value;
        }
        out
    }

    /// Assemble diagonal blocks into one matrix, zero elsewhere.
    pub fn block_diagonal(blocks: &[SymMatrix]) -> Self {
        let rows = blocks.iter().map(|b| b.rows).sum();
        let cols = blocks.iter().map(|b| b.cols).sum();
        let mut out = Self::zeros(rows, cols);
        let (mut r0, mut c0) = (0, 0);
        for block in blocks {
            for ((i, j), value) in block.iter_indexed() {
                out.entries[(r0 + i) * cols + c0 + j] = value.clone();
            }
            r0 += block.rows;
            c0 += block.cols;
        }
        out
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at `(row, col)`. Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> &Expr {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.entries[row * self.cols + col]
    }

    /// Row-major entries.
    pub fn entries(&self) -> &[Expr] {
        &self.entries
    }

    /// Entries with their `(row, col)` index, row-major.
    pub fn iter_indexed(&self) -> impl Iterator<Item = ((usize, usize), &Expr)> + '_ {
        let cols = self.cols.max(1);
        self.entries
            .iter()
            .enumerate()
            .map(move |(idx, value)| ((idx / cols, idx % cols), value))
    }

    // ── Queries ─────────────────────────────────────────────

    /// Square and `A[i][j] == A[j][i]` for every pair.
    ///
    /// Entries that differ structurally are compared after expansion, so
    /// `x + y` and `y + x` count as equal.
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                let upper = self.get(i, j);
                let lower = self.get(j, i);
                if upper != lower && !(upper - lower).expand().is_zero() {
                    return false;
                }
            }
        }
        true
    }

    /// Every entry is the literal zero.
    pub fn is_zero_matrix(&self) -> bool {
        self.entries.iter().all(Expr::is_zero)
    }

    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        for entry in &self.entries {
            entry.collect_symbols(&mut out);
        }
        out
    }

    // ── Operations ──────────────────────────────────────────

    pub fn map(&self, f: impl FnMut(&Expr) -> Expr) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            entries: self.entries.iter().map(f).collect(),
        }
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self.get(j, i).clone())
    }

    /// Multiply every entry by a scalar expression.
    pub fn scale(&self, factor: &Expr) -> Self {
        self.map(|entry| entry * factor)
    }

    pub fn negate(&self) -> Self {
        self.map(Expr::negate)
    }

    /// Elementwise sum. Returns an error if the shapes differ.
    pub fn try_add(&self, other: &SymMatrix) -> Result<Self, MatrixError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference. Returns an error if the shapes differ.
    pub fn try_sub(&self, other: &SymMatrix) -> Result<Self, MatrixError> {
        self.zip_with(other, |a, b| a - b)
    }

    fn zip_with(
        &self,
        other: &SymMatrix,
        f: impl Fn(&Expr, &Expr) -> Expr,
    ) -> Result<Self, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries: self
                .entries
                .iter()
                .zip(&other.entries)
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }

    /// Contiguous sub-matrix over the given row and column ranges.
    pub fn submatrix(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        Self::from_fn(rows.len(), cols.len(), |i, j| {
            self.get(rows.start + i, cols.start + j).clone()
        })
    }
}

impl std::ops::Index<(usize, usize)> for SymMatrix {
    type Output = Expr;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        self.get(row, col)
    }
}

impl<T: Into<Expr>> std::ops::Mul<T> for SymMatrix {
    type Output = SymMatrix;

    fn mul(self, rhs: T) -> Self::Output {
        self.scale(&rhs.into())
    }
}

impl<T: Into<Expr>> std::ops::Mul<T> for &SymMatrix {
    type Output = SymMatrix;

    fn mul(self, rhs: T) -> Self::Output {
        self.scale(&rhs.into())
    }
}

impl std::ops::Neg for SymMatrix {
    type Output = SymMatrix;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl std::ops::Neg for &SymMatrix {
    type Output = SymMatrix;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for SymMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Matrix([")?;
        for i in 0..self.rows {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str("[")?;
            for j in 0..self.cols {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", self.get(i, j))?;
            }
            f.write_str("]")?;
        }
        f.write_str("])")
    }
}
