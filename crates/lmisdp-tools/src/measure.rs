//! Per-stage wall time and RSS measurement.

use crate::memory::{capture_rss_bytes, rss_delta};
use std::time::{Duration, Instant};

/// Time and memory attributed to one named stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMeasurement {
    pub stage: String,
    pub duration: Duration,
    pub rss_before_bytes: Option<u64>,
    pub rss_after_bytes: Option<u64>,
    pub rss_delta_bytes: Option<i64>,
}

/// An open stage returned by [`MeasurementRecorder::begin_stage`].
#[derive(Debug)]
#[must_use = "pass the stage to `end_stage` to record it"]
pub struct StageStart {
    stage: String,
    started: Instant,
    rss_before_bytes: Option<u64>,
}

impl StageStart {
    pub fn stage(&self) -> &str {
        &self.stage
    }
}

/// Collects stage measurements in the order they finish.
#[derive(Debug, Default)]
pub struct MeasurementRecorder {
    stages: Vec<StageMeasurement>,
    capture_memory: bool,
}

impl MeasurementRecorder {
    /// Recorder that samples RSS around every stage.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            capture_memory: true,
        }
    }

    /// Recorder that only measures wall time.
    pub fn timing_only() -> Self {
        Self::default()
    }

    pub fn begin_stage(&self, stage: &str) -> StageStart {
        let rss_before_bytes = if self.capture_memory {
            capture_rss_bytes(stage)
        } else {
            None
        };
        StageStart {
            stage: stage.to_string(),
            started: Instant::now(),
            rss_before_bytes,
        }
    }

    pub fn end_stage(&mut self, start: StageStart) -> &StageMeasurement {
        let duration = start.started.elapsed();
        let rss_after_bytes = if self.capture_memory {
            capture_rss_bytes(&start.stage)
        } else {
            None
        };
        tracing::debug!(
            component = "tools",
            operation = "end_stage",
            status = "success",
            stage = start.stage.as_str(),
            duration_ms = duration.as_secs_f64() * 1000.0,
            "Stage finished"
        );
        self.stages.push(StageMeasurement {
            rss_delta_bytes: rss_delta(start.rss_before_bytes, rss_after_bytes),
            stage: start.stage,
            duration,
            rss_before_bytes: start.rss_before_bytes,
            rss_after_bytes,
        });
        &self.stages[self.stages.len() - 1]
    }

    /// Run `f` as a named stage and return its result.
    pub fn measure<T>(&mut self, stage: &str, f: impl FnOnce() -> T) -> T {
        let start = self.begin_stage(stage);
        let value = f();
        self.end_stage(start);
        value
    }

    pub fn push(&mut self, measurement: StageMeasurement) {
        self.stages.push(measurement);
    }

    pub fn stages(&self) -> &[StageMeasurement] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<StageMeasurement> {
        self.stages
    }
}
