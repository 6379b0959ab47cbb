//! Per-record resilience state machine.
//!
//! `Pending -> Accepted | Quarantined | Escalated`, or
//! `Pending -> Retrying -> ... -> Accepted | Quarantined | Escalated`.
//! Terminal states absorb every later input: an escalated record is never
//! re-attempted.

use reclaim_model::{EscalationReason, RecordStatus};

use crate::interruption::Interruption;
use crate::policy::Disposition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    #[default]
    Pending,
    Retrying {
        attempt: u32,
    },
    Accepted,
    Quarantined,
    Escalated(EscalationReason),
}

impl RecordState {
    #[must_use]
    pub fn apply(self, disposition: Disposition) -> Self {
        if self.is_terminal() {
            return self;
        }
        match disposition {
            Disposition::Accept => Self::Accepted,
            Disposition::Quarantine => Self::Quarantined,
            Disposition::Escalate(reason) => Self::Escalated(reason),
            Disposition::Retry { .. } => match self {
                Self::Retrying { attempt } => Self::Retrying {
                    attempt: attempt + 1,
                },
                _ => Self::Retrying { attempt: 1 },
            },
        }
    }

    #[must_use]
    pub fn interrupt(self, interruption: Interruption) -> Self {
        if self.is_terminal() {
            self
        } else {
            Self::Escalated(interruption.reason())
        }
    }

    /// Retries scheduled so far; zero outside `Retrying`.
    pub fn retries(self) -> u32 {
        match self {
            Self::Retrying { attempt } => attempt,
            _ => 0,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Quarantined | Self::Escalated(_))
    }

    pub fn status(self) -> Option<RecordStatus> {
        match self {
            Self::Accepted => Some(RecordStatus::Clean),
            Self::Quarantined => Some(RecordStatus::Quarantined),
            Self::Escalated(_) => Some(RecordStatus::Escalated),
            Self::Pending | Self::Retrying { .. } => None,
        }
    }
}
