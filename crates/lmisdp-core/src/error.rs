//! LMI pipeline error types.

use crate::relation::Side;
use crate::storage::Backend;
use lmisdp_expr::{LinearExprError, MatrixError};

/// Errors raised while validating or lowering LMIs and objectives.
#[derive(Debug, Clone, PartialEq)]
pub enum LmiError {
    /// Scalar expression not affine in the variables
    NonLinearExpression(LinearExprError),
    /// Matrix element not affine in the variables
    NonLinearMatrix {
        matrix: String,
        source: LinearExprError,
    },
    /// Matrix operand is not symmetric
    NonSymmetricMatrix { side: Side },
    /// Matrix operands have different shapes
    Shape {
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
    /// Block decomposition of a non-square matrix
    NonSquareMatrix { shape: (usize, usize) },
    /// Operands are not two matrices or a matrix and a zero
    InvalidOperands,
    /// Objective sense is neither minimize nor maximize
    InvalidObjectiveSense { value: String },
    /// Variable listed more than once
    DuplicateVariable { name: String },
    /// Numeric backend compiled out of this build
    BackendNotAvailable { backend: Backend },
    /// Symbolic matrix construction error
    Matrix(MatrixError),
}

impl LmiError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LmiError::NonLinearExpression(_) => "LMI_NON_LINEAR_EXPRESSION",
            LmiError::NonLinearMatrix { .. } => "LMI_NON_LINEAR_MATRIX",
            LmiError::NonSymmetricMatrix { .. } => "LMI_NON_SYMMETRIC",
            LmiError::Shape { .. } => "LMI_SHAPE",
            LmiError::NonSquareMatrix { .. } => "LMI_NON_SQUARE",
            LmiError::InvalidOperands => "LMI_INVALID_OPERANDS",
            LmiError::InvalidObjectiveSense { .. } => "OBJECTIVE_INVALID_SENSE",
            LmiError::DuplicateVariable { .. } => "VARIABLE_DUPLICATE",
            LmiError::BackendNotAvailable { .. } => "BACKEND_NOT_AVAILABLE",
            LmiError::Matrix(_) => "LMI_MATRIX",
        }
    }
}

impl std::fmt::Display for LmiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LmiError::NonLinearExpression(source) => write!(
                f,
                "[{}] Objective or expression is not linear: {}",
                self.code(),
                source
            ),
            LmiError::NonLinearMatrix { matrix, .. } => write!(
                f,
                "[{}] Matrix {} must be composed of linear expressions w.r.t. the variables",
                self.code(),
                matrix
            ),
            LmiError::NonSymmetricMatrix { side } => write!(
                f,
                "[{}] {} matrix is not symmetric",
                self.code(),
                side.as_str()
            ),
            LmiError::Shape { lhs, rhs } => write!(
                f,
                "[{}] LMI matrices have different shapes: {}x{} vs {}x{}",
                self.code(),
                lhs.0,
                lhs.1,
                rhs.0,
                rhs.1
            ),
            LmiError::NonSquareMatrix { shape } => write!(
                f,
                "[{}] Block decomposition needs a square matrix (got {}x{})",
                self.code(),
                shape.0,
                shape.1
            ),
            LmiError::InvalidOperands => write!(
                f,
                "[{}] LMI sides must be two matrices or a matrix and a zero",
                self.code()
            ),
            LmiError::InvalidObjectiveSense { value } => write!(
                f,
                "[{}] Objective sense must be 'minimize' or 'maximize' (got '{}')",
                self.code(),
                value
            ),
            LmiError::DuplicateVariable { name } => {
                write!(f, "[{}] Variable '{}' is listed twice", self.code(), name)
            }
            LmiError::BackendNotAvailable { backend } => write!(
                f,
                "[{}] Backend '{}' is not available in this build",
                self.code(),
                backend.as_str()
            ),
            LmiError::Matrix(source) => write!(f, "[{}] {}", self.code(), source),
        }
    }
}

impl std::error::Error for LmiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LmiError::NonLinearExpression(source) | LmiError::NonLinearMatrix { source, .. } => {
                Some(source)
            }
            LmiError::Matrix(source) => Some(source),
            _ => None,
        }
    }
}

impl From<LinearExprError> for LmiError {
    fn from(err: LinearExprError) -> Self {
        LmiError::NonLinearExpression(err)
    }
}

impl From<MatrixError> for LmiError {
    fn from(err: MatrixError) -> Self {
        LmiError::Matrix(err)
    }
}
