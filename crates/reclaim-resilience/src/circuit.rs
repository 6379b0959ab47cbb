//! Per-batch circuit breaker state.

use chrono::{DateTime, Utc};
use tracing::warn;

/// Consecutive non-recoverable failures within the current batch.
///
/// Closed -> Open only. The breaker is reset at the start of each batch and
/// never half-opens mid-batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircuitState {
    consecutive_failures: u32,
    open: bool,
    last_trip: Option<DateTime<Utc>>,
}

impl CircuitState {
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.open = false;
    }

    /// Count a non-recoverable failure. Returns `true` when this failure trips the breaker.
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if !self.open && self.consecutive_failures >= threshold {
            self.open = true;
            self.last_trip = Some(Utc::now());
            warn!(
                consecutive_failures = self.consecutive_failures,
                threshold, "circuit breaker opened"
            );
            return true;
        }
        false
    }

    pub fn record_success(&mut self) {
        if !self.open {
            self.consecutive_failures = 0;
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// When the breaker last opened; kept across batch resets.
    pub fn last_trip(&self) -> Option<DateTime<Utc>> {
        self.last_trip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_at_threshold_once() {
        let mut circuit = CircuitState::default();
        assert!(!circuit.record_failure(3));
        assert!(!circuit.record_failure(3));
        assert!(circuit.record_failure(3));
        assert!(circuit.is_open());
        assert!(circuit.last_trip().is_some());
        assert!(!circuit.record_failure(3));
    }

    #[test]
    fn success_resets_the_streak() {
        let mut circuit = CircuitState::default();
        circuit.record_failure(3);
        circuit.record_failure(3);
        circuit.record_success();
        assert_eq!(circuit.consecutive_failures(), 0);
        assert!(!circuit.record_failure(3));
    }

    #[test]
    fn reset_closes_but_keeps_last_trip() {
        let mut circuit = CircuitState::default();
        circuit.record_failure(1);
        circuit.reset();
        assert!(!circuit.is_open());
        assert_eq!(circuit.consecutive_failures(), 0);
        assert!(circuit.last_trip().is_some());
    }
}
