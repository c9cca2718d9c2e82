//! Serializers turning symbolic SDP problems into solver input.
//!
//! # Overview
//!
//! - [`ExportConfig`]: objective sense, block splitting, comment and backend
//! - [`ExportError`]: Error types for export operations
//! - [`Export`]: Trait implemented by every output format
//! - [`ConicExporter`]: `(c, Gs, hs)` triple for conic solvers
//! - [`SdpaSparse`], [`SdpaDense`]: SDPA text formats

mod conic;
mod config;
mod error;
mod sdpa;
mod traits;

pub use conic::{ConicExporter, ConicProblem, to_conic};
pub use config::ExportConfig;
pub use error::ExportError;
pub use sdpa::{SdpaDense, SdpaSparse, to_sdpa_dense, to_sdpa_sparse};
pub use traits::Export;
