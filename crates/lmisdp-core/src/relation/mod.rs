//! LMI relations and their canonical form.
//!
//! - [`operand`]: matrix and zero operands
//! - [`lmi`]: the relation record, validation and canonicalization
//! - [`expanded`]: `Σ Cᵢ·xᵢ + C₀` view of a relation
//! - [`latex`]: LaTeX rendering

mod expanded;
mod latex;
mod lmi;
mod operand;

pub use expanded::{ExpandedLmi, ExpandedOperand, LinearMatrix};
pub use latex::LatexLmi;
pub use lmi::{Lmi, LmiKind, Side};
pub use operand::{MatrixExpr, Operand};
