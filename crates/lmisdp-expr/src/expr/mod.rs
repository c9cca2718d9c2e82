//! Expression types for LMI formulation.
//!
//! - `core`: Expr: sums, products and powers over constants and symbols
//! - `terms`: TermKey and the term → coefficient mapping
//! - `expand`: distribution of products and integer powers

pub mod core;
pub mod expand;
pub mod terms;

pub use core::Expr;
pub use terms::TermKey;
