//! Free text normalization.

use reclaim_model::{CaseFold, FieldRule, FieldValue, IssueCode};

use crate::normalized::Normalized;

/// Trim, collapse whitespace runs and apply the field's string rule.
///
/// Steps run in a fixed order: whitespace collapse, trailing trim, case
/// fold, alphanumeric filter, prefix strip, length check. Lengths count
/// characters, not bytes.
pub fn normalize_text(raw: &str, rule: &FieldRule) -> Normalized {
    if raw.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return Normalized::failed(IssueCode::ControlCharacters, "value contains control characters");
    }

    let mut value = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !rule.trim_trailing.is_empty() {
        value = value
            .trim_end_matches(|c: char| rule.trim_trailing.contains(&c) || c.is_whitespace())
            .to_string();
    }
    match rule.case {
        Some(CaseFold::Upper) => value = value.to_uppercase(),
        Some(CaseFold::Lower) => value = value.to_lowercase(),
        None => {}
    }
    if rule.alnum_only {
        value.retain(char::is_alphanumeric);
    }
    value = strip_prefixes(value, &rule.strip_prefixes);

    if value.is_empty() {
        return Normalized::failed(IssueCode::InvalidFormat, "nothing left after normalization");
    }

    let len = value.chars().count();
    if let Some(min) = rule.min_len
        && len < min
    {
        return Normalized::failed(
            IssueCode::LengthOutOfRange,
            format!("length {len} is below minimum {min}"),
        );
    }
    if let Some(max) = rule.max_len
        && len > max
    {
        return Normalized::failed(
            IssueCode::LengthOutOfRange,
            format!("length {len} exceeds maximum {max}"),
        );
    }
    Normalized::ok(FieldValue::Text(value))
}

/// Remove the first matching prefix, case-insensitively, unless nothing would remain.
fn strip_prefixes(value: String, prefixes: &[String]) -> String {
    for prefix in prefixes {
        let Some(head) = value.get(..prefix.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(prefix) {
            let rest = value[prefix.len()..].trim_start();
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: &str, rule: &FieldRule) -> Option<String> {
        match normalize_text(raw, rule).value {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[test]
    fn collapses_whitespace_and_keeps_punctuation() {
        let rule = FieldRule::default();
        assert_eq!(
            text("  Singh,   Amar \t", &rule).as_deref(),
            Some("Singh, Amar")
        );
    }

    #[test]
    fn unit_number_rules() {
        let rule = FieldRule {
            case: Some(CaseFold::Upper),
            alnum_only: true,
            strip_prefixes: vec!["UNIT".to_string(), "BLDG".to_string()],
            ..FieldRule::default()
        };
        assert_eq!(text("4 b", &rule).as_deref(), Some("4B"));
        assert_eq!(text("#4B", &rule).as_deref(), Some("4B"));
        assert_eq!(text("Unit 12-c", &rule).as_deref(), Some("12C"));
        assert_eq!(text("UNIT", &rule).as_deref(), Some("UNIT"));
    }

    #[test]
    fn trims_trailing_commas() {
        let rule = FieldRule {
            trim_trailing: vec![','],
            ..FieldRule::default()
        };
        assert_eq!(text("Amar Singh, ,", &rule).as_deref(), Some("Amar Singh"));
    }

    #[test]
    fn length_counts_characters() {
        let rule = FieldRule {
            min_len: Some(2),
            max_len: Some(4),
            ..FieldRule::default()
        };
        assert_eq!(text("ÅÆØ", &rule).as_deref(), Some("ÅÆØ"));
        assert_eq!(
            normalize_text("A", &rule).code(),
            Some(IssueCode::LengthOutOfRange)
        );
        assert_eq!(
            normalize_text("ABCDE", &rule).code(),
            Some(IssueCode::LengthOutOfRange)
        );
    }

    #[test]
    fn rejects_control_characters() {
        let result = normalize_text("Amar\u{0007}Singh", &FieldRule::default());
        assert_eq!(result.code(), Some(IssueCode::ControlCharacters));
        assert_eq!(result.value, None);
        assert!(normalize_text("Amar\tSingh", &FieldRule::default()).is_ok());
    }
}
