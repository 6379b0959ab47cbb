//! Integer identifiers and pattern-coded identifiers.

use reclaim_model::{FieldRule, FieldValue, IssueCode};

use crate::normalized::Normalized;

const DEFAULT_PAD_WIDTH: usize = 3;

/// Drop every non-digit (`A1003` -> `1003`) and require a positive integer.
pub fn normalize_integer_id(raw: &str) -> Normalized {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Normalized::failed(IssueCode::InvalidFormat, "identifier has no digits");
    }
    match digits.parse::<i64>() {
        Ok(0) => Normalized::failed(IssueCode::InvalidFormat, "identifier must be positive"),
        Ok(id) => Normalized::ok(FieldValue::Integer(id)),
        Err(_) => Normalized::failed(IssueCode::InvalidFormat, "identifier is out of range"),
    }
}

/// Standardize to `prefix` + zero-padded number, e.g. `comp-7` -> `COMP007`.
pub fn normalize_pattern_code(raw: &str, rule: &FieldRule) -> Normalized {
    let prefix = rule.prefix.as_deref().unwrap_or_default();
    let width = rule.width.unwrap_or(DEFAULT_PAD_WIDTH);

    let upper = raw.trim().to_uppercase();
    let body = upper.strip_prefix(prefix).unwrap_or(&upper);
    let digits: String = body.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Normalized::failed(IssueCode::PatternMismatch, "no numeric portion to standardize");
    }
    match digits.parse::<u64>() {
        Ok(number) => Normalized::ok(FieldValue::Text(format!("{prefix}{number:0width$}"))),
        Err(_) => Normalized::failed(IssueCode::PatternMismatch, "numeric portion is out of range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_letters_from_ids() {
        assert_eq!(
            normalize_integer_id("A1003").value,
            Some(FieldValue::Integer(1003))
        );
        assert_eq!(
            normalize_integer_id(" #0042-x ").value,
            Some(FieldValue::Integer(42))
        );
    }

    #[test]
    fn rejects_non_positive_and_digitless_ids() {
        assert_eq!(normalize_integer_id("ABC").code(), Some(IssueCode::InvalidFormat));
        assert_eq!(normalize_integer_id("000").code(), Some(IssueCode::InvalidFormat));
        assert_eq!(
            normalize_integer_id("99999999999999999999").code(),
            Some(IssueCode::InvalidFormat)
        );
    }

    #[test]
    fn pads_pattern_codes() {
        let rule = FieldRule {
            prefix: Some("COMP".to_string()),
            ..FieldRule::default()
        };
        assert_eq!(
            normalize_pattern_code("comp-7", &rule).value,
            Some(FieldValue::Text("COMP007".to_string()))
        );
        assert_eq!(
            normalize_pattern_code("1234", &rule).value,
            Some(FieldValue::Text("COMP1234".to_string()))
        );
        let wide = FieldRule {
            width: Some(5),
            ..rule.clone()
        };
        assert_eq!(
            normalize_pattern_code("C 12", &wide).value,
            Some(FieldValue::Text("COMP00012".to_string()))
        );
        assert_eq!(
            normalize_pattern_code("COMP-X", &rule).code(),
            Some(IssueCode::PatternMismatch)
        );
    }
}
