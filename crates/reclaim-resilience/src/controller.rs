use reclaim_model::{EscalationReason, RecordStatus, RecordVerdict, ResilienceConfig};
use tracing::debug;

use crate::circuit::CircuitState;
use crate::policy::{Disposition, ResiliencePolicy};

/// Final outcome of a record as settled by [`ResilienceController::finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalization {
    pub status: RecordStatus,
    pub escalation: Option<EscalationReason>,
    /// This record tripped the circuit breaker.
    pub circuit_opened: bool,
}

/// Owns the circuit breaker for the batch in progress.
///
/// Records must be finalized in input order; the breaker counts consecutive
/// failures along that order, so outcomes do not depend on worker timing.
#[derive(Debug, Clone)]
pub struct ResilienceController {
    policy: ResiliencePolicy,
    circuit: CircuitState,
}

impl ResilienceController {
    pub fn new(config: &ResilienceConfig) -> Self {
        Self {
            policy: ResiliencePolicy::from_config(config),
            circuit: CircuitState::default(),
        }
    }

    pub fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    pub fn circuit(&self) -> &CircuitState {
        &self.circuit
    }

    pub fn is_open(&self) -> bool {
        self.circuit.is_open()
    }

    /// Close the breaker for a new batch.
    pub fn begin_batch(&mut self) {
        self.circuit.reset();
    }

    /// Settle a record's terminal status and update the breaker.
    ///
    /// Once the breaker is open, every later record of the batch is replaced
    /// by a bulk escalation regardless of what its worker computed. An
    /// escalation already set on the verdict (timeout, interruption) is kept
    /// and does not count toward the breaker.
    pub fn finalize(&mut self, verdict: &mut RecordVerdict) -> Finalization {
        if self.circuit.is_open() {
            *verdict = RecordVerdict::bulk_escalated(verdict.id.clone(), EscalationReason::CircuitOpen);
            return Finalization {
                status: RecordStatus::Escalated,
                escalation: Some(EscalationReason::CircuitOpen),
                circuit_opened: false,
            };
        }

        let disposition = match verdict.escalation {
            Some(reason) => Disposition::Escalate(reason),
            None => self.policy.settle(verdict),
        };
        let threshold = self.policy.circuit_breaker_threshold;
        let (status, escalation, circuit_opened) = match disposition {
            Disposition::Accept => {
                self.circuit.record_success();
                (RecordStatus::Clean, None, false)
            }
            Disposition::Quarantine => {
                self.circuit.record_success();
                (RecordStatus::Quarantined, None, false)
            }
            Disposition::Retry { .. } | Disposition::Escalate(EscalationReason::RetriesExhausted) => {
                let opened = self.circuit.record_failure(threshold);
                (RecordStatus::Escalated, Some(EscalationReason::RetriesExhausted), opened)
            }
            Disposition::Escalate(EscalationReason::TooManyIssues) => {
                self.circuit.record_success();
                (RecordStatus::Escalated, Some(EscalationReason::TooManyIssues), false)
            }
            Disposition::Escalate(reason) => (RecordStatus::Escalated, Some(reason), false),
        };

        verdict.status = status;
        verdict.escalation = escalation;
        if let Some(reason) = escalation {
            debug!(record = %verdict.id, reason = reason.as_str(), "record escalated");
        }
        Finalization {
            status,
            escalation,
            circuit_opened,
        }
    }
}

#[cfg(test)]
mod tests {
    use reclaim_model::{FieldIssue, FieldOutcome, IssueCode, RecordId};

    use super::*;

    fn controller(threshold: u32) -> ResilienceController {
        ResilienceController::new(&ResilienceConfig {
            circuit_breaker_threshold: threshold,
            ..ResilienceConfig::default()
        })
    }

    fn clean(row: u64) -> RecordVerdict {
        RecordVerdict {
            id: RecordId::new(row),
            outcomes: vec![],
            status: RecordStatus::Clean,
            retry_count: 0,
            escalation: None,
        }
    }

    fn blocked(row: u64) -> RecordVerdict {
        RecordVerdict {
            id: RecordId::new(row),
            outcomes: vec![FieldOutcome::failed(
                "record_id",
                true,
                None,
                FieldIssue::new(IssueCode::MissingRequired, "required field is empty"),
            )],
            status: RecordStatus::Escalated,
            retry_count: 3,
            escalation: None,
        }
    }

    #[test]
    fn consecutive_failures_open_the_circuit() {
        let mut controller = controller(2);
        assert!(!controller.finalize(&mut blocked(1)).circuit_opened);
        let second = controller.finalize(&mut blocked(2));
        assert!(second.circuit_opened);
        assert_eq!(second.escalation, Some(EscalationReason::RetriesExhausted));

        let mut after = clean(3);
        let third = controller.finalize(&mut after);
        assert_eq!(third.escalation, Some(EscalationReason::CircuitOpen));
        assert_eq!(after.retry_count, 0);
        assert!(after.outcomes.is_empty());
    }

    #[test]
    fn success_breaks_the_streak() {
        let mut controller = controller(2);
        controller.finalize(&mut blocked(1));
        assert_eq!(controller.finalize(&mut clean(2)).status, RecordStatus::Clean);
        assert!(!controller.finalize(&mut blocked(3)).circuit_opened);
        assert!(!controller.is_open());
    }

    #[test]
    fn worker_escalations_are_kept_and_not_counted() {
        let mut controller = controller(1);
        let mut timed_out = blocked(1);
        timed_out.escalation = Some(EscalationReason::TimedOut);
        let settled = controller.finalize(&mut timed_out);
        assert_eq!(settled.escalation, Some(EscalationReason::TimedOut));
        assert!(!controller.is_open());
    }

    #[test]
    fn new_batch_closes_the_circuit() {
        let mut controller = controller(1);
        controller.finalize(&mut blocked(1));
        assert!(controller.is_open());
        controller.begin_batch();
        assert_eq!(controller.finalize(&mut clean(2)).status, RecordStatus::Clean);
    }
}
