//! Field-level issue taxonomy and record escalation reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether an issue can be settled by quarantine or needs the retry path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recoverability {
    /// Retained with partial values for manual review.
    Recoverable,
    /// Retried with backoff, then escalated; counts toward the circuit breaker.
    NonRecoverable,
}

/// Issue codes attached to a [`FieldIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidFormat,
    UnknownBooleanValue,
    InvalidPhoneLength,
    PatternMismatch,
    InvalidEmailFormat,
    LengthOutOfRange,
    ControlCharacters,
    DuplicateIdentifier,
    MissingRequired,
    MaskingFailed,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "InvalidFormat",
            Self::UnknownBooleanValue => "UnknownBooleanValue",
            Self::InvalidPhoneLength => "InvalidPhoneLength",
            Self::PatternMismatch => "PatternMismatch",
            Self::InvalidEmailFormat => "InvalidEmailFormat",
            Self::LengthOutOfRange => "LengthOutOfRange",
            Self::ControlCharacters => "ControlCharacters",
            Self::DuplicateIdentifier => "DuplicateIdentifier",
            Self::MissingRequired => "MissingRequired",
            Self::MaskingFailed => "MaskingFailed",
        }
    }

    /// Default classification of the code, before any policy escalates it.
    pub fn recoverability(self) -> Recoverability {
        match self {
            Self::MissingRequired | Self::MaskingFailed => Recoverability::NonRecoverable,
            _ => Recoverability::Recoverable,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem found while normalizing one field. Never raised, always attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub code: IssueCode,
    pub message: String,
    /// Blocking issues take the retry/escalation path instead of quarantine.
    #[serde(default)]
    pub blocking: bool,
}

impl FieldIssue {
    /// Build an issue using the code's default recoverability.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            blocking: code.recoverability() == Recoverability::NonRecoverable,
        }
    }

    /// Build an issue that always blocks the record.
    pub fn blocking(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            blocking: true,
        }
    }

    pub fn recoverability(&self) -> Recoverability {
        if self.blocking {
            Recoverability::NonRecoverable
        } else {
            Recoverability::Recoverable
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Why a record left automated processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// A non-recoverable failure persisted through every retry.
    RetriesExhausted,
    /// More recoverable issues than the per-record limit allows.
    TooManyIssues,
    /// The batch circuit breaker was open when the record was reached.
    CircuitOpen,
    /// The run deadline expired before the record settled.
    TimedOut,
    /// An earlier batch breached the error-rate threshold and the run paused.
    ErrorThresholdPause,
}

impl EscalationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RetriesExhausted => "retries_exhausted",
            Self::TooManyIssues => "too_many_issues",
            Self::CircuitOpen => "circuit_open",
            Self::TimedOut => "timed_out",
            Self::ErrorThresholdPause => "error_threshold_pause",
        }
    }

    /// Remediation hints attached to escalation reports.
    pub fn suggested_actions(self) -> &'static [&'static str] {
        match self {
            Self::RetriesExhausted => &[
                "Check the record for missing required values",
                "Verify the token store and masking key are reachable",
                "Review the schema rule for the failing field",
            ],
            Self::TooManyIssues => &[
                "Review the data source for systematic issues",
                "Update validation rules if business requirements changed",
            ],
            Self::CircuitOpen => &[
                "Inspect the first failing records of the batch",
                "Check for schema or configuration drift",
                "Re-run the batch after remediation",
            ],
            Self::TimedOut => &[
                "Increase the run timeout or reduce the batch size",
                "Re-run the remaining records",
            ],
            Self::ErrorThresholdPause => &[
                "Review the batch that breached the error threshold",
                "Consider cleaning the data at the source system",
            ],
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recoverability_follows_code() {
        assert!(!FieldIssue::new(IssueCode::InvalidFormat, "x").blocking);
        assert!(FieldIssue::new(IssueCode::MissingRequired, "x").blocking);
        assert!(FieldIssue::new(IssueCode::MaskingFailed, "x").blocking);
        assert_eq!(
            FieldIssue::blocking(IssueCode::InvalidFormat, "x").recoverability(),
            Recoverability::NonRecoverable
        );
    }

    #[test]
    fn every_reason_has_actions() {
        for reason in [
            EscalationReason::RetriesExhausted,
            EscalationReason::TooManyIssues,
            EscalationReason::CircuitOpen,
            EscalationReason::TimedOut,
            EscalationReason::ErrorThresholdPause,
        ] {
            assert!(!reason.suggested_actions().is_empty(), "{reason}");
        }
    }
}
