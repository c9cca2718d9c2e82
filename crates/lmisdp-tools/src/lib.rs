//! Stage timing and memory instrumentation for the lmisdp pipeline.
//!
//! Used by the benchmark runner to attribute time and resident memory to the
//! canonicalize, split, extract and serialize stages.

pub mod measure;
pub mod memory;

pub use measure::{MeasurementRecorder, StageMeasurement, StageStart};
pub use memory::{MemoryError, MemorySnapshot, capture_rss_bytes, rss_delta};
