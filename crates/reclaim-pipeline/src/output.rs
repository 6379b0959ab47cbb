use reclaim_model::{AuditEvent, BatchMetrics, IssueLogEntry, RecordVerdict, RunSummary};
use serde::Serialize;

/// Everything a completed run produces, even under partial failure.
///
/// Each stream keeps input order.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub clean: Vec<RecordVerdict>,
    pub quarantined: Vec<RecordVerdict>,
    pub escalated: Vec<RecordVerdict>,
    pub issues: Vec<IssueLogEntry>,
    pub batches: Vec<BatchMetrics>,
    pub events: Vec<AuditEvent>,
    pub summary: RunSummary,
    pub schema_fingerprint: String,
}

impl RunOutput {
    pub fn has_escalations(&self) -> bool {
        !self.escalated.is_empty()
    }

    /// All verdicts merged back into input order.
    pub fn records(&self) -> Vec<&RecordVerdict> {
        let mut records: Vec<&RecordVerdict> = self
            .clean
            .iter()
            .chain(&self.quarantined)
            .chain(&self.escalated)
            .collect();
        records.sort_by_key(|verdict| verdict.id.row);
        records
    }

    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AuditEvent> {
        self.events.iter().filter(move |event| event.name() == name)
    }
}
