//! Currency amounts to integer minor units.
//!
//! Parsing is exact decimal arithmetic on the written digits; no binary
//! floating point is involved, so `19.99` at precision 2 is always `1999`.

use reclaim_model::{FieldValue, IssueCode};

use crate::normalized::Normalized;

/// Multi-character markers, removed before single symbols.
const CURRENCY_CODES: &[&str] = &["HK$", "USD", "EUR", "GBP", "HKD"];
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₪', '₽'];

/// Significant digits accepted in the written amount.
const MAX_DIGITS: usize = 36;

pub fn normalize_currency(raw: &str, precision: u32) -> Normalized {
    match parse_minor_units(raw, precision) {
        Some(units) => Normalized::ok(FieldValue::MinorUnits(units)),
        None => Normalized::failed(IssueCode::InvalidFormat, "unparsable currency amount"),
    }
}

/// Parse an amount such as `$1,234.56`, `(12.50)` or `1.5e3` into
/// `round(value * 10^precision)`, rounding half away from zero.
pub fn parse_minor_units(raw: &str, precision: u32) -> Option<i64> {
    let mut text = raw.trim();
    let mut negative = false;
    if text.len() >= 2
        && let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')'))
    {
        negative = true;
        text = inner;
    }

    let mut cleaned = text.to_ascii_uppercase();
    for code in CURRENCY_CODES {
        cleaned = cleaned.replace(code, "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    let mut body = cleaned.as_str();
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest;
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest;
    }

    let magnitude = scaled_magnitude(body, precision)?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn scaled_magnitude(body: &str, precision: u32) -> Option<i128> {
    let (mantissa, exponent) = match body.split_once('E') {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i32>().ok()?),
        None => (body, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let frac_part = frac_part.trim_end_matches('0');
    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    if digits.len() > MAX_DIGITS {
        return None;
    }
    let coefficient: i128 = digits.parse().ok()?;

    let frac_len = i64::try_from(frac_part.len()).ok()?;
    let shift = i64::from(exponent) - frac_len + i64::from(precision);
    if shift >= 0 {
        let factor = 10i128.checked_pow(u32::try_from(shift).ok()?)?;
        coefficient.checked_mul(factor)
    } else {
        let places = u32::try_from(-shift).ok()?;
        // Below half a minor unit whatever the digits.
        if places > 37 {
            return Some(0);
        }
        let divisor = 10i128.pow(places);
        let (quotient, remainder) = (coefficient / divisor, coefficient % divisor);
        Some(if remainder * 2 >= divisor {
            quotient + 1
        } else {
            quotient
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_layouts() {
        assert_eq!(parse_minor_units("$1,234.56", 2), Some(123_456));
        assert_eq!(parse_minor_units("(12.50)", 2), Some(-1250));
        assert_eq!(parse_minor_units("-€ 3", 2), Some(-300));
        assert_eq!(parse_minor_units("HK$ 10", 2), Some(1000));
        assert_eq!(parse_minor_units("usd 7.5", 2), Some(750));
        assert_eq!(parse_minor_units("0.005", 2), Some(1));
        assert_eq!(parse_minor_units("-0.005", 2), Some(-1));
        assert_eq!(parse_minor_units("0.004", 2), Some(0));
        assert_eq!(parse_minor_units("12", 0), Some(12));
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(parse_minor_units("1.5e3", 2), Some(150_000));
        assert_eq!(parse_minor_units("2.5E-1", 2), Some(25));
        assert_eq!(parse_minor_units("1e-40", 2), Some(0));
    }

    #[test]
    fn rejects_unparsable() {
        for raw in ["1.2k", "", "$", "abc", "1.2.3", "1e", "--5", "(5", "1e999"] {
            assert_eq!(parse_minor_units(raw, 2), None, "{raw}");
        }
        let result = normalize_currency("1.2k", 2);
        assert_eq!(result.value, None);
        assert_eq!(result.code(), Some(IssueCode::InvalidFormat));
    }

    #[test]
    fn out_of_range_is_unparsable() {
        assert_eq!(parse_minor_units("999999999999999999999", 2), None);
    }
}
