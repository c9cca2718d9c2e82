//! Export configuration types.

use lmisdp_core::{Backend, ObjectiveSense, SplitBlocks};

/// Options shared by every exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Objective direction. Defaults to minimize.
    pub sense: ObjectiveSense,
    /// Block splitting of canonical LMI matrices. Defaults to full decomposition.
    pub split_blocks: SplitBlocks,
    /// Comment line written at the top of SDPA files.
    pub comment: Option<String>,
    /// Coefficient backend. `None` uses the exporter's preferred backend.
    pub backend: Option<Backend>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sense: ObjectiveSense::Minimize,
            split_blocks: SplitBlocks::Full,
            comment: None,
            backend: None,
        }
    }
}

impl ExportConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = sense;
        self
    }

    pub fn with_split_blocks(mut self, split: SplitBlocks) -> Self {
        self.split_blocks = split;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Backend to extract with, falling back to `preferred`.
    pub fn backend_or(&self, preferred: Backend) -> Backend {
        self.backend.unwrap_or(preferred)
    }

    /// Check if every option still has its default value.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
