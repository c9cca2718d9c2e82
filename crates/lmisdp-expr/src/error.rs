//! Expression and symbolic matrix errors.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearExprError {
    /// The expression is not affine in the declared variables, even after expansion.
    NonLinearExpression { expr: String },
}

impl LinearExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LinearExprError::NonLinearExpression { .. } => "EXPR_NON_LINEAR",
        }
    }
}

impl std::fmt::Display for LinearExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearExprError::NonLinearExpression { expr } => write!(
                f,
                "[{}] Expression '{}' must be linear w.r.t. the variables",
                self.code(),
                expr
            ),
        }
    }
}

impl std::error::Error for LinearExprError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// A row of the input grid has a different length than the first row.
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Elementwise operation on matrices of different shapes.
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

impl MatrixError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            MatrixError::RaggedRows { .. } => "MATRIX_RAGGED_ROWS",
            MatrixError::ShapeMismatch { .. } => "MATRIX_SHAPE_MISMATCH",
        }
    }
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::RaggedRows {
                row,
                expected,
                found,
            } => write!(
                f,
                "[{}] Row {} has {} entries, expected {}",
                self.code(),
                row,
                found,
                expected
            ),
            MatrixError::ShapeMismatch { left, right } => write!(
                f,
                "[{}] Matrix shapes differ: {}x{} vs {}x{}",
                self.code(),
                left.0,
                left.1,
                right.0,
                right.1
            ),
        }
    }
}

impl std::error::Error for MatrixError {}
