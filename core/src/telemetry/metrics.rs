use serde::Serialize;
use std::sync::Mutex;

use crate::interface::GluedRecord;

/// Counters shared across a processing run.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub glued: usize,
    pub errors: usize,
    pub degenerate: usize,
    pub relaxed: usize,
    pub non_finite: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_glued(&self, record: &GluedRecord) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.glued += 1;
            if record.outcome.is_degenerate() {
                counts.degenerate += 1;
            }
            if record.outcome.is_relaxed() {
                counts.relaxed += 1;
            }
            if !record.is_valid() {
                counts.non_finite += 1;
            }
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
