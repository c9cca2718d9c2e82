//! Exporter trait for abstraction over output formats.

use crate::{ExportConfig, ExportError};
use lmisdp_core::SdpProblem;

/// Trait for output formats.
///
/// Implementations lower the problem with the configured objective sense,
/// block splitting and backend, then render it in their own format.
pub trait Export {
    /// The value produced by this exporter.
    type Output;

    /// # Errors
    ///
    /// Returns an `ExportError` if:
    /// - The objective or an LMI is not linear in the variables
    /// - The requested backend or format is compiled out
    fn export(
        &self,
        problem: &SdpProblem,
        config: &ExportConfig,
    ) -> Result<Self::Output, ExportError>;
}
