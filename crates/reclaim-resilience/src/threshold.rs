//! Batch error-rate threshold.

use reclaim_model::{BatchMetrics, ProcessingConfig};

/// Pause-and-report trigger, independent of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorThreshold {
    /// Share of non-clean records, in percent.
    pub percent: f64,
    pub max_errors: usize,
}

impl ErrorThreshold {
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self {
            percent: config.error_threshold_percent,
            max_errors: config.max_errors_per_batch,
        }
    }

    /// Checked on closed metrics: either limit exceeded.
    pub fn breached(&self, metrics: &BatchMetrics) -> bool {
        metrics.error_rate * 100.0 > self.percent || metrics.non_clean() > self.max_errors
    }
}
