//! Resident memory snapshots of the current process.

use std::time::Instant;
use sysinfo::System;

/// Resident memory of this process at one point in time.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    /// Resident set size in bytes
    pub rss_bytes: u64,
    pub timestamp: Instant,
    /// Pipeline stage the snapshot belongs to (e.g. "extract")
    pub stage: String,
}

/// Errors produced by memory instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl MemoryError {
    pub fn code(&self) -> &'static str {
        match self {
            MemoryError::ProcessNotFound { .. } => "MEMORY_PROCESS_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "[{}] Failed to locate process {}", self.code(), pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

impl MemorySnapshot {
    /// # Errors
    ///
    /// Returns an error if the current process cannot be located.
    pub fn capture(stage: &str) -> Result<Self, MemoryError> {
        let pid = sysinfo::Pid::from(std::process::id() as usize);

        // Refresh this process only, memory fields only.
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::Some(&[pid]),
            true,
            sysinfo::ProcessRefreshKind::nothing().with_memory(),
        );

        let process = sys.process(pid).ok_or(MemoryError::ProcessNotFound {
            pid: std::process::id(),
        })?;

        Ok(MemorySnapshot {
            rss_bytes: process.memory(),
            timestamp: Instant::now(),
            stage: stage.to_string(),
        })
    }

    /// RSS growth since `earlier` in bytes (negative when memory was released).
    pub fn since(&self, earlier: &Self) -> i64 {
        self.rss_bytes as i64 - earlier.rss_bytes as i64
    }
}

/// Best-effort RSS reading; failures are logged and yield `None`.
pub fn capture_rss_bytes(stage: &str) -> Option<u64> {
    match MemorySnapshot::capture(stage) {
        Ok(snapshot) => Some(snapshot.rss_bytes),
        Err(err) => {
            tracing::warn!(
                component = "tools",
                operation = "capture_rss",
                status = "error",
                stage,
                error = %err,
                "RSS snapshot unavailable"
            );
            None
        }
    }
}

pub fn rss_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    match (before, after) {
        (Some(before), Some(after)) => Some(after as i64 - before as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_capture() {
        let snapshot = MemorySnapshot::capture("extract").unwrap_or_else(|err| panic!("{}", err));
        assert_eq!(snapshot.stage, "extract");
        assert!(snapshot.rss_bytes > 0);
        assert!(capture_rss_bytes("extract").is_some());
    }

    #[test]
    fn test_snapshot_since() {
        let earlier = MemorySnapshot {
            rss_bytes: 1000,
            timestamp: Instant::now(),
            stage: "canonical".to_string(),
        };
        let later = MemorySnapshot {
            rss_bytes: 1500,
            timestamp: Instant::now(),
            stage: "split".to_string(),
        };
        assert_eq!(later.since(&earlier), 500);
        assert_eq!(earlier.since(&later), -500);
    }

    #[test]
    fn test_rss_delta_requires_both_readings() {
        assert_eq!(rss_delta(Some(10), Some(4)), Some(-6));
        assert_eq!(rss_delta(None, Some(4)), None);
        assert_eq!(rss_delta(Some(10), None), None);
    }

    #[test]
    fn test_error_display() {
        let err = MemoryError::ProcessNotFound { pid: 7 };
        assert!(err.to_string().contains("MEMORY_PROCESS_NOT_FOUND"));
        assert!(err.to_string().contains('7'));
    }
}
