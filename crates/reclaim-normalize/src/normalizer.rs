use reclaim_model::{ConfigError, FieldSpec, FieldValue, NormalizationConfig, PhoneCountry, SemanticType};
use tracing::trace;

use crate::boolean::normalize_boolean;
use crate::contact::{normalize_email, normalize_phone};
use crate::currency::normalize_currency;
use crate::date::DateMatcher;
use crate::identifier::{normalize_integer_id, normalize_pattern_code};
use crate::normalized::Normalized;
use crate::text::normalize_text;

/// Dispatches raw values to the normalizer for the field's semantic type.
///
/// Holds only read-only configuration and can be shared across workers.
#[derive(Debug, Clone)]
pub struct Normalizer {
    dates: DateMatcher,
    currency_precision: u32,
    phone_country: PhoneCountry,
}

impl Normalizer {
    pub fn new(config: &NormalizationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            dates: DateMatcher::new(config)?,
            currency_precision: config.currency_precision,
            phone_country: config.phone_country,
        })
    }

    pub fn normalize(&self, raw: Option<&str>, spec: &FieldSpec) -> Normalized {
        let present = raw.filter(|value| !value.trim().is_empty());
        let result = match (present, spec.rule.default.as_deref()) {
            (Some(value), _) => self.normalize_present(value, spec),
            (None, Some(default)) if !default.trim().is_empty() => {
                self.normalize_present(default, spec)
            }
            (None, _) => self.absent(spec),
        };
        if let Some(issue) = &result.issue {
            trace!(field = %spec.name, code = %issue.code, "field issue");
        }
        result
    }

    /// Value for a field with no input and no default.
    fn absent(&self, spec: &FieldSpec) -> Normalized {
        match spec.semantic_type {
            SemanticType::Currency => Normalized::ok(FieldValue::MinorUnits(0)),
            _ => Normalized::empty(),
        }
    }

    fn normalize_present(&self, raw: &str, spec: &FieldSpec) -> Normalized {
        let rule = &spec.rule;
        match spec.semantic_type {
            SemanticType::IntegerId => normalize_integer_id(raw),
            SemanticType::String => normalize_text(raw, rule),
            SemanticType::Date => self.dates.normalize(raw),
            SemanticType::Boolean => normalize_boolean(raw),
            SemanticType::Currency => {
                normalize_currency(raw, rule.precision.unwrap_or(self.currency_precision))
            }
            SemanticType::Phone => normalize_phone(raw, rule.country.unwrap_or(self.phone_country)),
            SemanticType::Email => normalize_email(raw),
            SemanticType::PatternCode => normalize_pattern_code(raw, rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use reclaim_model::{FieldRule, IssueCode};

    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&NormalizationConfig::default()).expect("normalizer")
    }

    #[test]
    fn absent_values_carry_no_issue() {
        let n = normalizer();
        let id = FieldSpec::new("record_id", SemanticType::IntegerId).required();
        assert_eq!(n.normalize(None, &id), Normalized::empty());
        assert_eq!(n.normalize(Some("   "), &id), Normalized::empty());

        let balance = FieldSpec::new("balance_cents", SemanticType::Currency);
        assert_eq!(
            n.normalize(None, &balance),
            Normalized::ok(FieldValue::MinorUnits(0))
        );
    }

    #[test]
    fn default_is_normalized_like_input() {
        let spec = FieldSpec::new("active_status", SemanticType::Boolean).with_rule(FieldRule {
            default: Some("Inactive".to_string()),
            ..FieldRule::default()
        });
        assert_eq!(
            normalizer().normalize(Some(""), &spec).value,
            Some(FieldValue::Boolean(false))
        );
    }

    #[test]
    fn field_rule_overrides_config() {
        let spec = FieldSpec::new("fee", SemanticType::Currency).with_rule(FieldRule {
            precision: Some(0),
            ..FieldRule::default()
        });
        assert_eq!(
            normalizer().normalize(Some("12.5"), &spec).value,
            Some(FieldValue::MinorUnits(13))
        );

        let spec = FieldSpec::new("phone", SemanticType::Phone).with_rule(FieldRule {
            country: Some(PhoneCountry::International),
            ..FieldRule::default()
        });
        assert!(normalizer().normalize(Some("+44 20 7946 0958"), &spec).is_ok());
    }

    #[test]
    fn dispatches_by_declared_type() {
        let n = normalizer();
        let date = FieldSpec::new("move_in_date", SemanticType::Date);
        assert_eq!(
            n.normalize(Some("1"), &date).code(),
            Some(IssueCode::InvalidFormat)
        );
        let flag = FieldSpec::new("active_status", SemanticType::Boolean);
        assert_eq!(
            n.normalize(Some("1"), &flag).value,
            Some(FieldValue::Boolean(true))
        );
    }
}
