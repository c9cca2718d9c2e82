pub mod error;
pub mod expr;
pub mod linear;
pub mod matrix;
pub mod symbol;

pub use error::{LinearExprError, MatrixError};
pub use expr::{Expr, TermKey};
pub use linear::{LinearForm, linear_form};
pub use matrix::SymMatrix;
pub use symbol::{Symbol, symbols};
