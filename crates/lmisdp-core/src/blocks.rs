//! Diagonal block decomposition.
//!
//! A symmetric matrix is cut into the finest sequence of contiguous diagonal
//! blocks such that every non-zero element lies inside one block.

use crate::error::LmiError;
use lmisdp_expr::SymMatrix;
use nalgebra::DMatrix;

/// Zero/non-zero structure of a matrix.
pub trait ZeroPattern {
    fn pattern_shape(&self) -> (usize, usize);

    fn is_zero_at(&self, row: usize, col: usize) -> bool;
}

impl ZeroPattern for SymMatrix {
    fn pattern_shape(&self) -> (usize, usize) {
        self.shape()
    }

    /// An entry counts as zero once like terms are merged, so `y - y` does
    /// not couple its row and column.
    fn is_zero_at(&self, row: usize, col: usize) -> bool {
        let entry = self.get(row, col);
        entry.is_zero() || entry.expand().is_zero()
    }
}

impl ZeroPattern for DMatrix<f64> {
    fn pattern_shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn is_zero_at(&self, row: usize, col: usize) -> bool {
        self[(row, col)] == 0.0
    }
}

/// Exclusive end index of each diagonal block, ascending; the last is `n`.
///
/// A dense matrix gives `[n]`, a diagonal one `[1, 2, ..., n]` and an empty
/// matrix no blocks at all.
pub fn block_boundaries<M: ZeroPattern + ?Sized>(matrix: &M) -> Result<Vec<usize>, LmiError> {
    let (rows, cols) = matrix.pattern_shape();
    if rows != cols {
        return Err(LmiError::NonSquareMatrix {
            shape: (rows, cols),
        });
    }
    let n = rows;

    let mut boundaries = Vec::new();
    let mut start = 0;
    while start < n {
        let mut end = start;
        let mut cursor = start;
        while cursor <= end {
            // Bottom-most row coupled to `cursor` below the current block end.
            let coupled = ((end + 1)..n)
                .rev()
                .find(|&row| !matrix.is_zero_at(row, cursor) || !matrix.is_zero_at(cursor, row));
            if let Some(row) = coupled {
                end = row;
            }
            cursor += 1;
        }
        boundaries.push(end + 1);
        start = end + 1;
    }
    Ok(boundaries)
}

/// Split into diagonal blocks; off-block elements are all zero and dropped.
pub fn split_diag_blocks(matrix: &SymMatrix) -> Result<Vec<SymMatrix>, LmiError> {
    let boundaries = block_boundaries(matrix)?;
    let mut start = 0;
    Ok(boundaries
        .into_iter()
        .map(|end| {
            let block = matrix.submatrix(start..end, start..end);
            start = end;
            block
        })
        .collect())
}

pub fn split_dense_blocks(matrix: &DMatrix<f64>) -> Result<Vec<DMatrix<f64>>, LmiError> {
    let boundaries = block_boundaries(matrix)?;
    let mut start = 0;
    Ok(boundaries
        .into_iter()
        .map(|end| {
            let len = end - start;
            let block = matrix.view((start, start), (len, len)).into_owned();
            start = end;
            block
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use lmisdp_expr::{Expr, symbols};

    #[test]
    fn test_boundaries_three_by_three() {
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 2.0, 3.0, 0.0, 3.0, 4.0]);
        assert_eq!(block_boundaries(&m).expect("square"), vec![1, 3]);
        let blocks = split_dense_blocks(&m).expect("square");
        assert_eq!(blocks[0], DMatrix::from_element(1, 1, 1.0));
        assert_eq!(blocks[1], DMatrix::from_row_slice(2, 2, &[2.0, 3.0, 3.0, 4.0]));
    }

    #[test]
    fn test_boundaries_dense_and_diagonal() {
        let dense = DMatrix::from_element(4, 4, 1.0);
        assert_eq!(block_boundaries(&dense).expect("square"), vec![4]);
        let diagonal = DMatrix::<f64>::identity(4, 4);
        assert_eq!(block_boundaries(&diagonal).expect("square"), vec![1, 2, 3, 4]);
        let zeros = DMatrix::<f64>::zeros(3, 3);
        assert_eq!(block_boundaries(&zeros).expect("square"), vec![1, 2, 3]);
    }

    #[test]
    fn test_boundaries_corner_coupling_spans_everything() {
        // Only (0, 3) couples, which forces a single block.
        let mut m = DMatrix::<f64>::identity(4, 4);
        m[(0, 3)] = 5.0;
        m[(3, 0)] = 5.0;
        assert_eq!(block_boundaries(&m).expect("square"), vec![4]);
    }

    #[test]
    fn test_boundaries_empty_matrix() {
        let m = DMatrix::<f64>::zeros(0, 0);
        assert!(block_boundaries(&m).expect("square").is_empty());
        assert!(split_diag_blocks(&SymMatrix::zeros(0, 0)).expect("square").is_empty());
    }

    #[test]
    fn test_boundaries_non_square() {
        let m = DMatrix::<f64>::zeros(2, 3);
        assert_eq!(
            block_boundaries(&m),
            Err(LmiError::NonSquareMatrix { shape: (2, 3) })
        );
    }

    #[test]
    fn test_split_reassembles_symbolic() {
        let v = symbols("x y");
        let m = SymMatrix::from_rows([
            [Expr::from(&v[0]), Expr::zero(), Expr::zero()],
            [Expr::zero(), Expr::from(&v[1]), 2.0 * &v[0]],
            [Expr::zero(), 2.0 * &v[0], Expr::constant(1.0)],
        ])
        .expect("square");
        let blocks = split_diag_blocks(&m).expect("square");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].shape(), (2, 2));
        assert_eq!(SymMatrix::block_diagonal(&blocks), m);
    }

    #[test]
    fn test_boundaries_ignore_cancelling_entries() {
        let v = symbols("x y");
        let cancel = Expr::from(&v[1]) - &v[1];
        assert!(!cancel.is_zero());
        let m = SymMatrix::from_rows([
            [Expr::from(&v[0]), cancel.clone()],
            [cancel, Expr::from(&v[1])],
        ])
        .expect("square");
        assert_eq!(block_boundaries(&m).expect("square"), vec![1, 2]);
    }
}
