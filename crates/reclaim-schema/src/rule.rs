//! Validation-rule expression parsing.
//!
//! A rule is a `;`-separated list of `key` or `key=value` tokens, e.g.
//! `upper; alnum; strip_prefix=UNIT|BLDG` or `prefix=COMP; width=3`.

use reclaim_model::{CaseFold, FieldRule, PhoneCountry, PiiClass, PiiTag, SemanticType};

use crate::error::SchemaError;

const STRING_TOKENS: &[&str] = &[
    "min_len",
    "max_len",
    "upper",
    "lower",
    "alnum",
    "strip_prefix",
    "trim_trailing",
];

const MAX_PAD_WIDTH: usize = 18;
const MAX_PRECISION: u32 = 6;

/// Parse a rule expression for one field.
pub fn parse_rule(
    field: &str,
    semantic_type: SemanticType,
    expr: &str,
) -> Result<FieldRule, SchemaError> {
    let mut rule = FieldRule::default();

    for token in expr.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key.trim().to_ascii_lowercase(), Some(value.trim())),
            None => (token.to_ascii_lowercase(), None),
        };
        check_applicable(field, semantic_type, &key)?;

        match (key.as_str(), value) {
            ("min_len", Some(v)) => rule.min_len = Some(parse_number(field, &key, v)?),
            ("max_len", Some(v)) => rule.max_len = Some(parse_number(field, &key, v)?),
            ("upper", None) => rule.case = Some(CaseFold::Upper),
            ("lower", None) => rule.case = Some(CaseFold::Lower),
            ("alnum", None) => rule.alnum_only = true,
            ("strip_prefix", Some(v)) => {
                rule.strip_prefixes = v
                    .split('|')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ("trim_trailing", Some(v)) => rule.trim_trailing = v.chars().collect(),
            ("prefix", Some(v)) if !v.is_empty() => rule.prefix = Some(v.to_ascii_uppercase()),
            ("width", Some(v)) => {
                let width: usize = parse_number(field, &key, v)?;
                if width == 0 || width > MAX_PAD_WIDTH {
                    return Err(invalid(field, &key, format!("must be 1..={MAX_PAD_WIDTH}")));
                }
                rule.width = Some(width);
            }
            ("country", Some(v)) => {
                rule.country = Some(
                    v.parse::<PhoneCountry>()
                        .map_err(|message| invalid(field, &key, message))?,
                );
            }
            ("precision", Some(v)) => {
                let precision: u32 = parse_number(field, &key, v)?;
                if precision > MAX_PRECISION {
                    return Err(invalid(field, &key, format!("must be at most {MAX_PRECISION}")));
                }
                rule.precision = Some(precision);
            }
            ("default", Some(v)) => rule.default = Some(v.to_string()),
            ("pii", Some(v)) => {
                rule.pii = Some(if v.eq_ignore_ascii_case("none") {
                    PiiTag::Exempt
                } else {
                    PiiTag::Class(
                        v.parse::<PiiClass>()
                            .map_err(|message| invalid(field, &key, message))?,
                    )
                });
            }
            (
                "min_len" | "max_len" | "strip_prefix" | "trim_trailing" | "prefix" | "width"
                | "country" | "precision" | "default" | "pii",
                _,
            ) => return Err(invalid(field, &key, "expects a value".to_string())),
            ("upper" | "lower" | "alnum", Some(_)) => {
                return Err(invalid(field, &key, "takes no value".to_string()));
            }
            _ => {
                return Err(SchemaError::UnknownRuleToken {
                    field: field.to_string(),
                    token: token.to_string(),
                });
            }
        }
    }

    if let (Some(min), Some(max)) = (rule.min_len, rule.max_len)
        && min > max
    {
        return Err(invalid(
            field,
            "min_len",
            format!("min_len {min} exceeds max_len {max}"),
        ));
    }
    if semantic_type == SemanticType::PatternCode && rule.prefix.is_none() {
        return Err(SchemaError::MissingRuleToken {
            field: field.to_string(),
            semantic_type: semantic_type.to_string(),
            token: "prefix".to_string(),
        });
    }

    Ok(rule)
}

/// Type-specific tokens are rejected on other semantic types.
fn check_applicable(
    field: &str,
    semantic_type: SemanticType,
    key: &str,
) -> Result<(), SchemaError> {
    let applicable = match key {
        "default" | "pii" => true,
        "prefix" | "width" => semantic_type == SemanticType::PatternCode,
        "country" => semantic_type == SemanticType::Phone,
        "precision" => semantic_type == SemanticType::Currency,
        k if STRING_TOKENS.contains(&k) => semantic_type == SemanticType::String,
        // Unknown tokens are reported by the caller.
        _ => true,
    };
    if applicable {
        Ok(())
    } else {
        Err(invalid(
            field,
            key,
            format!("not applicable to {semantic_type} fields"),
        ))
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, key: &str, value: &str) -> Result<T, SchemaError> {
    value
        .parse::<T>()
        .map_err(|_| invalid(field, key, format!("'{value}' is not a non-negative integer")))
}

fn invalid(field: &str, token: &str, message: String) -> SchemaError {
    SchemaError::InvalidRuleValue {
        field: field.to_string(),
        token: token.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_tokens() {
        let rule = parse_rule(
            "unit_number",
            SemanticType::String,
            "upper; alnum; strip_prefix=UNIT|BLDG ; max_len=10",
        )
        .expect("parse rule");
        assert_eq!(rule.case, Some(CaseFold::Upper));
        assert!(rule.alnum_only);
        assert_eq!(rule.strip_prefixes, vec!["UNIT", "BLDG"]);
        assert_eq!(rule.max_len, Some(10));
    }

    #[test]
    fn empty_expression_is_default() {
        let rule = parse_rule("client_name", SemanticType::String, " ; ").expect("parse");
        assert_eq!(rule, FieldRule::default());
    }

    #[test]
    fn pattern_code_requires_prefix() {
        let err = parse_rule("company_id", SemanticType::PatternCode, "width=3")
            .expect_err("prefix missing");
        assert!(matches!(err, SchemaError::MissingRuleToken { .. }));
        let rule = parse_rule("company_id", SemanticType::PatternCode, "prefix=comp;width=4")
            .expect("parse");
        assert_eq!(rule.prefix.as_deref(), Some("COMP"));
        assert_eq!(rule.width, Some(4));
    }

    #[test]
    fn rejects_unknown_and_misplaced_tokens() {
        assert!(matches!(
            parse_rule("x", SemanticType::String, "shout"),
            Err(SchemaError::UnknownRuleToken { .. })
        ));
        assert!(matches!(
            parse_rule("x", SemanticType::Date, "precision=2"),
            Err(SchemaError::InvalidRuleValue { .. })
        ));
        assert!(matches!(
            parse_rule("x", SemanticType::String, "min_len=5;max_len=2"),
            Err(SchemaError::InvalidRuleValue { .. })
        ));
        assert!(matches!(
            parse_rule("x", SemanticType::String, "upper=yes"),
            Err(SchemaError::InvalidRuleValue { .. })
        ));
    }

    #[test]
    fn parses_pii_and_default() {
        let rule = parse_rule("tax_ref", SemanticType::String, "pii=ssn;default=N/A").expect("parse");
        assert_eq!(rule.pii, Some(PiiTag::Class(PiiClass::Ssn)));
        assert_eq!(rule.default.as_deref(), Some("N/A"));
        let rule = parse_rule("client_name", SemanticType::String, "pii=none").expect("parse");
        assert_eq!(rule.pii, Some(PiiTag::Exempt));
    }
}
