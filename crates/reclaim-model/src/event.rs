//! Auditable events emitted by the batch orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::{EscalationReason, IssueCode};
use crate::record::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    BatchStarted {
        batch_id: String,
        records: usize,
    },
    RetryScheduled {
        record: RecordId,
        attempt: u32,
        delay_ms: u64,
    },
    RecordQuarantined {
        record: RecordId,
        codes: Vec<IssueCode>,
    },
    RecordEscalated {
        record: RecordId,
        reason: EscalationReason,
        suggested_actions: Vec<String>,
    },
    CircuitOpened {
        batch_id: String,
        consecutive_failures: u32,
        at: DateTime<Utc>,
    },
    ErrorThresholdBreached {
        batch_id: String,
        error_rate: f64,
        non_clean: usize,
    },
    RunTimedOut {
        batch_id: String,
        remaining: usize,
    },
    BatchClosed {
        batch_id: String,
        clean: usize,
        quarantined: usize,
        escalated: usize,
    },
}

impl AuditEvent {
    pub fn escalated(record: RecordId, reason: EscalationReason) -> Self {
        Self::RecordEscalated {
            record,
            reason,
            suggested_actions: reason
                .suggested_actions()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchStarted { .. } => "batch_started",
            Self::RetryScheduled { .. } => "retry_scheduled",
            Self::RecordQuarantined { .. } => "record_quarantined",
            Self::RecordEscalated { .. } => "record_escalated",
            Self::CircuitOpened { .. } => "circuit_opened",
            Self::ErrorThresholdBreached { .. } => "error_threshold_breached",
            Self::RunTimedOut { .. } => "run_timed_out",
            Self::BatchClosed { .. } => "batch_closed",
        }
    }
}
