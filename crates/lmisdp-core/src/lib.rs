//! Symbolic LMI relations lowered to numeric coefficient bundles.

pub mod blocks;
pub mod coeffs;
pub mod error;
pub mod objective;
pub mod problem;
pub mod relation;
pub mod storage;

pub use blocks::{ZeroPattern, block_boundaries, split_dense_blocks, split_diag_blocks};
pub use coeffs::{CoefficientBundle, NumericBundle, extract_coefficients, extract_with_backend};
pub use error::LmiError;
pub use objective::{ObjectiveSense, objective_to_coeffs};
pub use problem::{
    NumericProblem, SdpProblem, SplitBlocks, canonical_blocks, discover_variables, lmi_to_coeffs,
};
pub use relation::{
    ExpandedLmi, ExpandedOperand, LatexLmi, LinearMatrix, Lmi, LmiKind, MatrixExpr, Operand, Side,
};
pub use storage::{Backend, CoefficientStorage, LilMatrix};

pub use lmisdp_expr::{Expr, Symbol, SymMatrix, symbols};
