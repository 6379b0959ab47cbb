//! Raw input records and the verdicts produced for them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::issue::{EscalationReason, FieldIssue};
use crate::pii::PiiClass;

/// Ordered legacy field name -> raw value mapping for one input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based position in the input stream.
    pub row: u64,
    pub fields: Vec<(String, Option<String>)>,
}

impl RawRecord {
    pub fn new(row: u64) -> Self {
        Self {
            row,
            fields: Vec::new(),
        }
    }

    /// Build a record from `(column, value)` pairs; empty strings stay present.
    pub fn from_pairs<K, V>(row: u64, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            row,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.fields.push((name.into(), value.map(str::to_string)));
        self
    }

    /// Raw value for a column; `None` when the column is missing or null.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Identity of a record in outputs and the issue log.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId {
    pub row: u64,
    /// Raw value of the schema's identity field, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl RecordId {
    pub fn new(row: u64) -> Self {
        Self { row, key: None }
    }

    #[must_use]
    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.key = key;
        self
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "row {} ({key})", self.row),
            None => write!(f, "row {}", self.row),
        }
    }
}

/// Typed normalized value.
///
/// Serialized untagged, so `MinorUnits` reads back as `Integer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    MinorUnits(i64),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Integer(v) | Self::MinorUnits(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Surrogate issued by pseudonymization, checked for collisions run-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudonymClaim {
    pub class: PiiClass,
    /// Keyed digest of the original input (hex).
    pub digest: String,
    pub round: u32,
}

/// Result of normalizing (and possibly masking) one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: String,
    pub required: bool,
    pub value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<FieldIssue>,
    #[serde(default)]
    pub masked: bool,
    #[serde(skip)]
    pub pseudonym: Option<PseudonymClaim>,
}

impl FieldOutcome {
    pub fn valid(field: impl Into<String>, required: bool, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            required,
            value: Some(value),
            issue: None,
            masked: false,
            pseudonym: None,
        }
    }

    pub fn empty(field: impl Into<String>, required: bool) -> Self {
        Self {
            field: field.into(),
            required,
            value: None,
            issue: None,
            masked: false,
            pseudonym: None,
        }
    }

    pub fn failed(
        field: impl Into<String>,
        required: bool,
        value: Option<FieldValue>,
        issue: FieldIssue,
    ) -> Self {
        Self {
            field: field.into(),
            required,
            value,
            issue: Some(issue),
            masked: false,
            pseudonym: None,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.issue.as_ref().is_some_and(|issue| issue.blocking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Clean,
    Quarantined,
    Escalated,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::Quarantined => "quarantined",
            Self::Escalated => "escalated",
        })
    }
}

/// Per-record verdict: created by the validator, finalized by the resilience controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVerdict {
    pub id: RecordId,
    pub outcomes: Vec<FieldOutcome>,
    pub status: RecordStatus,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationReason>,
}

impl RecordVerdict {
    /// Verdict for a record escalated without being processed.
    pub fn bulk_escalated(id: RecordId, reason: EscalationReason) -> Self {
        Self {
            id,
            outcomes: Vec::new(),
            status: RecordStatus::Escalated,
            retry_count: 0,
            escalation: Some(reason),
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = (&FieldOutcome, &FieldIssue)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.issue.as_ref().map(|issue| (outcome, issue)))
    }

    pub fn issue_count(&self) -> usize {
        self.issues().count()
    }

    pub fn has_blocking_issue(&self) -> bool {
        self.outcomes.iter().any(FieldOutcome::is_blocking)
    }

    pub fn outcome(&self, field: &str) -> Option<&FieldOutcome> {
        self.outcomes.iter().find(|outcome| outcome.field == field)
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.outcome(field).and_then(|outcome| outcome.value.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_record_lookup() {
        let record = RawRecord::from_pairs(3, [("rec_id", "A1003"), ("unit", "")])
            .with_field("phone", None);
        assert_eq!(record.get("rec_id"), Some("A1003"));
        assert_eq!(record.get("unit"), Some(""));
        assert_eq!(record.get("phone"), None);
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn field_values_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).expect("valid date");
        assert_eq!(FieldValue::Date(date).to_string(), "2024-03-17");
        assert_eq!(FieldValue::MinorUnits(-1250).to_string(), "-1250");
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
    }

    #[test]
    fn record_id_display_includes_key() {
        let id = RecordId::new(4).with_key(Some("A1003".to_string()));
        assert_eq!(id.to_string(), "row 4 (A1003)");
    }
}
