use reclaim_model::EscalationReason;

/// Batch-level condition that stops automated processing of a record.
///
/// Never crashes the run; the orchestrator turns it into bulk escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interruption {
    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("run deadline expired")]
    TimedOut,
}

impl Interruption {
    pub fn reason(self) -> EscalationReason {
        match self {
            Self::CircuitOpen => EscalationReason::CircuitOpen,
            Self::TimedOut => EscalationReason::TimedOut,
        }
    }
}
