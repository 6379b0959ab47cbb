//! Boolean token mapping.

use reclaim_model::{FieldValue, IssueCode};

use crate::normalized::Normalized;

/// Tokens read as `true`, compared case-insensitively.
pub const TRUE_TOKENS: &[&str] = &["y", "yes", "true", "1", "active", "t", "on", "enabled"];

/// Tokens read as `false`, compared case-insensitively.
pub const FALSE_TOKENS: &[&str] = &[
    "n", "no", "false", "0", "inactive", "f", "off", "disabled",
];

/// Map a fixed token set to a boolean; anything else yields no value.
pub fn normalize_boolean(raw: &str) -> Normalized {
    let token = raw.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Normalized::ok(FieldValue::Boolean(true))
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Normalized::ok(FieldValue::Boolean(false))
    } else {
        Normalized::failed(
            IssueCode::UnknownBooleanValue,
            "value is not a recognized boolean token",
        )
    }
}
