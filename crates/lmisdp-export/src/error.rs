//! Export error types.

use lmisdp_core::LmiError;

/// Error type for export operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Lowering the symbolic problem failed.
    Lmi(LmiError),
    /// Exporter compiled out of this build.
    NotAvailable { operation: &'static str },
    /// Writing the output text failed.
    Format(String),
}

impl ExportError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::Lmi(err) => err.code(),
            ExportError::NotAvailable { .. } => "EXPORT_NOT_AVAILABLE",
            ExportError::Format(_) => "EXPORT_FORMAT",
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Lmi(err) => write!(f, "{}", err),
            ExportError::NotAvailable { operation } => write!(
                f,
                "[{}] Function {} not available in this build",
                self.code(),
                operation
            ),
            ExportError::Format(msg) => {
                write!(f, "[{}] Failed to write output: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Lmi(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LmiError> for ExportError {
    fn from(err: LmiError) -> Self {
        ExportError::Lmi(err)
    }
}

impl From<std::fmt::Error> for ExportError {
    fn from(err: std::fmt::Error) -> Self {
        ExportError::Format(err.to_string())
    }
}
