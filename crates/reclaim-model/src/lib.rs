pub mod config;
pub mod error;
pub mod event;
pub mod issue;
pub mod metrics;
pub mod pii;
pub mod record;
pub mod schema;

pub use config::{
    ConfigReport, InvalidValuePolicy, MaskingStrategies, NormalizationConfig, PipelineConfig,
    ProcessingConfig, ResilienceConfig, SecurityConfig,
};
pub use error::ConfigError;
pub use event::AuditEvent;
pub use issue::{EscalationReason, FieldIssue, IssueCode, Recoverability};
pub use metrics::{BatchMetrics, IssueLogEntry, RunSummary};
pub use pii::{MaskingStrategy, PiiClass, PiiTag, ProtectionLevel};
pub use record::{
    FieldOutcome, FieldValue, PseudonymClaim, RawRecord, RecordId, RecordStatus, RecordVerdict,
};
pub use schema::{CaseFold, FieldRule, FieldSpec, PhoneCountry, SemanticType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_counts_blocking_issues() {
        let verdict = RecordVerdict {
            id: RecordId::new(1),
            outcomes: vec![
                FieldOutcome::valid("record_id", true, FieldValue::Integer(1003)),
                FieldOutcome::failed(
                    "balance_cents",
                    true,
                    None,
                    FieldIssue::new(IssueCode::InvalidFormat, "unparsable amount '1.2k'"),
                ),
                FieldOutcome::failed(
                    "email",
                    true,
                    None,
                    FieldIssue::blocking(IssueCode::MissingRequired, "required field is empty"),
                ),
            ],
            status: RecordStatus::Quarantined,
            retry_count: 0,
            escalation: None,
        };
        assert_eq!(verdict.issue_count(), 2);
        assert!(verdict.has_blocking_issue());
        assert_eq!(verdict.issues().count(), 2);
    }

    #[test]
    fn verdict_serializes() {
        let verdict = RecordVerdict::bulk_escalated(RecordId::new(7), EscalationReason::CircuitOpen);
        let json = serde_json::to_string(&verdict).expect("serialize verdict");
        assert!(json.contains("\"status\":\"escalated\""));
        assert!(json.contains("\"escalation\":\"circuit_open\""));
        let round: RecordVerdict = serde_json::from_str(&json).expect("deserialize verdict");
        assert_eq!(round.id.row, 7);
    }
}
