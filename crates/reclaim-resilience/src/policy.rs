//! Pure retry / quarantine / escalation decisions.

use std::time::Duration;

use reclaim_model::{EscalationReason, RecordStatus, RecordVerdict, ResilienceConfig};

use crate::retry::RetryPolicy;

/// What happens to a record after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accept,
    Quarantine,
    Retry { delay: Duration },
    Escalate(EscalationReason),
}

/// Shared read-only by workers and the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResiliencePolicy {
    pub retry: RetryPolicy,
    pub max_issues_per_record: usize,
    pub circuit_breaker_threshold: u32,
}

impl ResiliencePolicy {
    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            max_issues_per_record: config.max_issues_per_record,
            circuit_breaker_threshold: config.circuit_breaker_threshold,
        }
    }

    /// Worker-side decision after an attempt: retry while a non-recoverable
    /// failure persists and budget remains.
    pub fn next_step(&self, verdict: &RecordVerdict) -> Disposition {
        if verdict.has_blocking_issue() && self.retry.allows(verdict.retry_count) {
            Disposition::Retry {
                delay: self.retry.delay_for(verdict.retry_count),
            }
        } else {
            self.settle(verdict)
        }
    }

    /// Final decision with no attempts left. Never returns `Retry`.
    pub fn settle(&self, verdict: &RecordVerdict) -> Disposition {
        if verdict.has_blocking_issue() {
            return Disposition::Escalate(EscalationReason::RetriesExhausted);
        }
        match verdict.status {
            RecordStatus::Clean => Disposition::Accept,
            RecordStatus::Quarantined if verdict.issue_count() > self.max_issues_per_record => {
                Disposition::Escalate(EscalationReason::TooManyIssues)
            }
            RecordStatus::Quarantined => Disposition::Quarantine,
            RecordStatus::Escalated => Disposition::Escalate(
                verdict
                    .escalation
                    .unwrap_or(EscalationReason::RetriesExhausted),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use reclaim_model::{FieldIssue, FieldOutcome, IssueCode, RecordId};

    use super::*;

    fn verdict(status: RecordStatus, issues: &[IssueCode], retry_count: u32) -> RecordVerdict {
        RecordVerdict {
            id: RecordId::new(1),
            outcomes: issues
                .iter()
                .map(|code| FieldOutcome::failed("f", true, None, FieldIssue::new(*code, "x")))
                .collect(),
            status,
            retry_count,
            escalation: None,
        }
    }

    fn policy() -> ResiliencePolicy {
        ResiliencePolicy::from_config(&ResilienceConfig::default())
    }

    #[test]
    fn blocking_failures_retry_then_escalate() {
        let blocked = verdict(RecordStatus::Escalated, &[IssueCode::MissingRequired], 0);
        assert_eq!(
            policy().next_step(&blocked),
            Disposition::Retry {
                delay: Duration::from_millis(100)
            }
        );
        let exhausted = verdict(RecordStatus::Escalated, &[IssueCode::MissingRequired], 3);
        assert_eq!(
            policy().next_step(&exhausted),
            Disposition::Escalate(EscalationReason::RetriesExhausted)
        );
    }

    #[test]
    fn recoverable_issues_quarantine_within_limit() {
        let few = verdict(RecordStatus::Quarantined, &[IssueCode::InvalidFormat; 5], 0);
        assert_eq!(policy().next_step(&few), Disposition::Quarantine);
        let many = verdict(RecordStatus::Quarantined, &[IssueCode::InvalidFormat; 6], 0);
        assert_eq!(
            policy().next_step(&many),
            Disposition::Escalate(EscalationReason::TooManyIssues)
        );
        assert_eq!(
            policy().next_step(&verdict(RecordStatus::Clean, &[], 0)),
            Disposition::Accept
        );
    }
}
