use reclaim_model::{FieldIssue, FieldValue, IssueCode};

/// Result of one normalizer call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    pub value: Option<FieldValue>,
    pub issue: Option<FieldIssue>,
}

impl Normalized {
    pub fn ok(value: FieldValue) -> Self {
        Self {
            value: Some(value),
            issue: None,
        }
    }

    /// No value and nothing wrong with that.
    pub fn empty() -> Self {
        Self::default()
    }

    /// No usable value.
    pub fn failed(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            value: None,
            issue: Some(FieldIssue::new(code, message)),
        }
    }

    /// A value that is kept but flagged.
    pub fn flagged(value: FieldValue, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            issue: Some(FieldIssue::new(code, message)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.issue.is_none()
    }

    pub fn code(&self) -> Option<IssueCode> {
        self.issue.as_ref().map(|issue| issue.code)
    }
}
