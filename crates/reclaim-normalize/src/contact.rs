//! Phone numbers and email addresses.

use std::sync::LazyLock;

use reclaim_model::{FieldValue, IssueCode, PhoneCountry};
use regex::Regex;

use crate::normalized::Normalized;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// Keep digits only and check the count against the country profile.
///
/// A wrong digit count keeps the digits and flags the field.
pub fn normalize_phone(raw: &str, country: PhoneCountry) -> Normalized {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let (min, max) = country.digit_range();

    if let Some(trunk) = country.trunk_prefix()
        && digits.len() == max + 1
        && digits.starts_with(trunk)
    {
        digits.remove(0);
    }

    if digits.is_empty() {
        return Normalized::failed(IssueCode::InvalidPhoneLength, "phone number has no digits");
    }
    if (min..=max).contains(&digits.len()) {
        Normalized::ok(FieldValue::Text(digits))
    } else {
        let message = if min == max {
            format!("expected {min} digits, found {}", digits.len())
        } else {
            format!("expected {min} to {max} digits, found {}", digits.len())
        };
        Normalized::flagged(FieldValue::Text(digits), IssueCode::InvalidPhoneLength, message)
    }
}

/// Validate the address and lowercase the domain; the local part keeps its case.
pub fn normalize_email(raw: &str) -> Normalized {
    let trimmed = raw.trim();
    if !EMAIL.is_match(trimmed) {
        return Normalized::failed(IssueCode::InvalidEmailFormat, "not a valid email address");
    }
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => Normalized::ok(FieldValue::Text(format!(
            "{local}@{}",
            domain.to_ascii_lowercase()
        ))),
        None => Normalized::failed(IssueCode::InvalidEmailFormat, "not a valid email address"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(result: &Normalized) -> Option<&str> {
        match &result.value {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[test]
    fn us_numbers() {
        let result = normalize_phone("(555) 123-4567", PhoneCountry::Us);
        assert!(result.is_ok());
        assert_eq!(text(&result), Some("5551234567"));

        let result = normalize_phone("+1 555 123 4567", PhoneCountry::Us);
        assert_eq!(text(&result), Some("5551234567"));
    }

    #[test]
    fn wrong_length_is_kept_and_flagged() {
        let result = normalize_phone("555-1234", PhoneCountry::Us);
        assert_eq!(result.code(), Some(IssueCode::InvalidPhoneLength));
        assert_eq!(text(&result), Some("5551234"));

        let result = normalize_phone("ext.", PhoneCountry::Us);
        assert_eq!(result.value, None);
        assert_eq!(result.code(), Some(IssueCode::InvalidPhoneLength));
    }

    #[test]
    fn international_range() {
        assert!(normalize_phone("+44 20 7946 0958", PhoneCountry::International).is_ok());
        assert!(normalize_phone("020 7946 0958", PhoneCountry::Gb).is_ok());
        assert!(!normalize_phone("1234567", PhoneCountry::International).is_ok());
    }

    #[test]
    fn email_domain_is_lowercased() {
        let result = normalize_email("  Amar.Singh@Example.COM ");
        assert_eq!(text(&result), Some("Amar.Singh@example.com"));
    }

    #[test]
    fn invalid_email() {
        for raw in ["amar@", "@example.com", "amar example.com", "amar@example", "a@b@c.com"] {
            let result = normalize_email(raw);
            assert_eq!(result.code(), Some(IssueCode::InvalidEmailFormat), "{raw}");
            assert_eq!(result.value, None);
        }
    }
}
