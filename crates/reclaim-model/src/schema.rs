//! Field definitions held by the schema registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pii::PiiTag;

/// Semantic type that selects the normalizer for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    IntegerId,
    String,
    Date,
    Boolean,
    Currency,
    Phone,
    Email,
    PatternCode,
}

impl SemanticType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntegerId => "integer_id",
            Self::String => "string",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::Currency => "currency",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::PatternCode => "pattern_code",
        }
    }

    /// Human description of the transformation, used in field mapping reports.
    pub fn transformation(self) -> &'static str {
        match self {
            Self::IntegerId => "Extract digits, require a positive integer",
            Self::String => "Trim whitespace, collapse internal spaces",
            Self::Date => "Parse known input patterns to ISO 8601",
            Self::Boolean => "Map fixed token set to true/false",
            Self::Currency => "Parse currency to integer minor units",
            Self::Phone => "Extract digits, check country length",
            Self::Email => "Validate address, lowercase domain",
            Self::PatternCode => "Standardize to prefix and zero-padded number",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "integer_id" | "id" => Ok(Self::IntegerId),
            "str" | "string" | "text" => Ok(Self::String),
            "date" => Ok(Self::Date),
            "bool" | "boolean" => Ok(Self::Boolean),
            "currency" | "money" | "minor_units" => Ok(Self::Currency),
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "pattern" | "code" | "pattern_code" => Ok(Self::PatternCode),
            other => Err(format!("unknown semantic type '{other}'")),
        }
    }
}

/// Country profile for phone digit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhoneCountry {
    #[default]
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "CA")]
    Ca,
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "INTL")]
    International,
}

impl PhoneCountry {
    /// Accepted national digit counts (inclusive).
    pub fn digit_range(self) -> (usize, usize) {
        match self {
            Self::Us | Self::Ca => (10, 10),
            Self::Gb => (10, 11),
            Self::International => (8, 15),
        }
    }

    /// North American numbers may carry the leading `1` trunk code.
    pub fn trunk_prefix(self) -> Option<char> {
        match self {
            Self::Us | Self::Ca => Some('1'),
            Self::Gb | Self::International => None,
        }
    }
}

impl FromStr for PhoneCountry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::Us),
            "CA" => Ok(Self::Ca),
            "GB" | "UK" => Ok(Self::Gb),
            "INTL" | "INTERNATIONAL" => Ok(Self::International),
            other => Err(format!("unknown phone country '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFold {
    Upper,
    Lower,
}

/// Parsed form of a field's validation-rule expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub case: Option<CaseFold>,
    /// Drop every character that is not alphanumeric.
    pub alnum_only: bool,
    /// Leading tokens removed after case folding (e.g. `UNIT`, `BLDG`).
    pub strip_prefixes: Vec<String>,
    /// Characters trimmed from the end of the value.
    pub trim_trailing: Vec<char>,
    /// Prefix for pattern-coded values.
    pub prefix: Option<String>,
    /// Zero-pad width for pattern-coded values.
    pub width: Option<usize>,
    /// Per-field phone profile override.
    pub country: Option<PhoneCountry>,
    /// Per-field currency precision override.
    pub precision: Option<u32>,
    /// Raw value substituted when the field is absent.
    pub default: Option<String>,
    pub pii: Option<PiiTag>,
}

/// One field of the target schema. Identity is `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Legacy column the raw value is read from; defaults to `name`.
    pub source: Option<String>,
    pub semantic_type: SemanticType,
    pub required: bool,
    pub rule: FieldRule,
    /// Rule expression as written in the schema source.
    pub rule_expr: String,
    pub description: String,
    pub example: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            source: None,
            semantic_type,
            required: false,
            rule: FieldRule::default(),
            rule_expr: String::new(),
            description: String::new(),
            example: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }

    /// Column name the raw value is looked up under.
    pub fn source_column(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_type_aliases() {
        assert_eq!("int".parse::<SemanticType>(), Ok(SemanticType::IntegerId));
        assert_eq!("STR".parse::<SemanticType>(), Ok(SemanticType::String));
        assert_eq!("bool".parse::<SemanticType>(), Ok(SemanticType::Boolean));
        assert_eq!("money".parse::<SemanticType>(), Ok(SemanticType::Currency));
        assert!("uuid".parse::<SemanticType>().is_err());
    }

    #[test]
    fn source_column_defaults_to_name() {
        let spec = FieldSpec::new("record_id", SemanticType::IntegerId);
        assert_eq!(spec.source_column(), "record_id");
        let spec = spec.with_source("rec_id");
        assert_eq!(spec.source_column(), "rec_id");
    }
}
