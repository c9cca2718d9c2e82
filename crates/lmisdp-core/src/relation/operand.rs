use lmisdp_expr::{SymMatrix, Symbol};
use std::collections::BTreeSet;
use std::fmt;

/// A matrix side of an LMI, either dense or carrying block-diagonal structure.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixExpr {
    Dense(SymMatrix),
    BlockDiag(Vec<SymMatrix>),
}

impl MatrixExpr {
    pub fn block_diag(blocks: impl IntoIterator<Item = SymMatrix>) -> Self {
        MatrixExpr::BlockDiag(blocks.into_iter().collect())
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            MatrixExpr::Dense(m) => m.shape(),
            MatrixExpr::BlockDiag(blocks) => blocks.iter().fold((0, 0), |(rows, cols), block| {
                (rows + block.rows(), cols + block.cols())
            }),
        }
    }

    /// A block-diagonal matrix is symmetric when each diagonal block is.
    pub fn is_symmetric(&self) -> bool {
        match self {
            MatrixExpr::Dense(m) => m.is_symmetric(),
            MatrixExpr::BlockDiag(blocks) => blocks.iter().all(SymMatrix::is_symmetric),
        }
    }

    pub fn blocks(&self) -> Option<&[SymMatrix]> {
        match self {
            MatrixExpr::Dense(_) => None,
            MatrixExpr::BlockDiag(blocks) => Some(blocks),
        }
    }

    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        match self {
            MatrixExpr::Dense(m) => m.free_symbols(),
            MatrixExpr::BlockDiag(blocks) => {
                blocks.iter().flat_map(SymMatrix::free_symbols).collect()
            }
        }
    }

    pub fn to_dense(&self) -> SymMatrix {
        match self {
            MatrixExpr::Dense(m) => m.clone(),
            MatrixExpr::BlockDiag(blocks) => SymMatrix::block_diagonal(blocks),
        }
    }

    pub fn into_dense(self) -> SymMatrix {
        match self {
            MatrixExpr::Dense(m) => m,
            MatrixExpr::BlockDiag(blocks) => SymMatrix::block_diagonal(&blocks),
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            MatrixExpr::Dense(m) => MatrixExpr::Dense(m.negate()),
            MatrixExpr::BlockDiag(blocks) => {
                MatrixExpr::BlockDiag(blocks.iter().map(SymMatrix::negate).collect())
            }
        }
    }

    /// `self - other` for operands of equal overall shape.
    ///
    /// Block structure survives when both sides share the same block layout.
    pub(crate) fn difference(&self, other: &MatrixExpr) -> MatrixExpr {
        if let (MatrixExpr::BlockDiag(left), MatrixExpr::BlockDiag(right)) = (self, other) {
            let same_layout = left.len() == right.len()
                && left.iter().zip(right).all(|(a, b)| a.shape() == b.shape());
            if same_layout {
                return MatrixExpr::BlockDiag(
                    left.iter()
                        .zip(right)
                        .map(|(a, b)| {
                            SymMatrix::from_fn(a.rows(), a.cols(), |i, j| a.get(i, j) - b.get(i, j))
                        })
                        .collect(),
                );
            }
        }
        let (left, right) = (self.to_dense(), other.to_dense());
        MatrixExpr::Dense(SymMatrix::from_fn(left.rows(), left.cols(), |i, j| {
            left.get(i, j) - right.get(i, j)
        }))
    }
}

impl From<SymMatrix> for MatrixExpr {
    fn from(m: SymMatrix) -> Self {
        MatrixExpr::Dense(m)
    }
}

impl fmt::Display for MatrixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixExpr::Dense(m) => write!(f, "{m}"),
            MatrixExpr::BlockDiag(blocks) => {
                f.write_str("BlockDiagMatrix(")?;
                for (idx, block) in blocks.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{block}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One side of an LMI.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Zero,
    Matrix(MatrixExpr),
}

impl Operand {
    pub fn is_zero(&self) -> bool {
        matches!(self, Operand::Zero)
    }

    pub fn as_matrix(&self) -> Option<&MatrixExpr> {
        match self {
            Operand::Zero => None,
            Operand::Matrix(m) => Some(m),
        }
    }
}

impl From<SymMatrix> for Operand {
    fn from(m: SymMatrix) -> Self {
        Operand::Matrix(MatrixExpr::Dense(m))
    }
}

impl From<MatrixExpr> for Operand {
    fn from(m: MatrixExpr) -> Self {
        Operand::Matrix(m)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Zero => f.write_str("0"),
            Operand::Matrix(m) => write!(f, "{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmisdp_expr::{Expr, symbols};

    #[test]
    fn test_block_diag_shape_and_dense() {
        let a = SymMatrix::from_rows([[1.0]]).expect("square");
        let b = SymMatrix::from_rows([[2.0, 3.0], [3.0, 4.0]]).expect("square");
        let m = MatrixExpr::block_diag([a, b]);
        assert_eq!(m.shape(), (3, 3));
        let dense = m.to_dense();
        assert!(dense[(0, 1)].is_zero());
        assert_eq!(dense[(2, 1)].as_constant(), Some(3.0));
        assert_eq!(m.blocks().map(<[SymMatrix]>::len), Some(2));
    }

    #[test]
    fn test_difference_keeps_matching_block_layout() {
        let v = symbols("x");
        let a = SymMatrix::from_diagonal([Expr::from(&v[0])]);
        let one = SymMatrix::from_diagonal([1.0]);
        let left = MatrixExpr::block_diag([a.clone(), a]);
        let right = MatrixExpr::block_diag([one.clone(), one]);
        let diff = left.difference(&right);
        assert_eq!(diff.blocks().map(<[SymMatrix]>::len), Some(2));

        let dense_right = MatrixExpr::Dense(SymMatrix::identity(2));
        let diff = left.difference(&dense_right);
        assert!(matches!(diff, MatrixExpr::Dense(_)));
        assert_eq!(diff.shape(), (2, 2));
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(Operand::Zero.to_string(), "0");
        let m = SymMatrix::from_rows([[1.0, 2.0], [2.0, 3.5]]).expect("square");
        assert_eq!(Operand::from(m).to_string(), "Matrix([[1, 2], [2, 3.5]])");
    }
}
