//! PII classes, masking strategies and protection levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Class of personally identifying data a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiClass {
    Email,
    Phone,
    Ssn,
    CreditCard,
    Name,
    Other,
}

impl PiiClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Ssn => "SSN",
            Self::CreditCard => "CREDIT_CARD",
            Self::Name => "NAME",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for PiiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "ssn" => Ok(Self::Ssn),
            "credit_card" | "card" => Ok(Self::CreditCard),
            "name" => Ok(Self::Name),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown PII class '{other}'")),
        }
    }
}

/// Explicit PII tagging carried by a schema rule (`pii=ssn`, `pii=none`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiTag {
    /// Never classify this field, whatever its name suggests.
    Exempt,
    Class(PiiClass),
}

/// How a PII value is replaced in clean output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingStrategy {
    /// Reveal the first/last characters, redact the rest.
    Partial,
    /// One-way keyed hash, deterministic per input.
    Hash,
    /// Opaque token issued by the external token store.
    Tokenize,
    /// Stable surrogate, collision-checked within the run.
    Pseudonymize,
}

impl fmt::Display for MaskingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Partial => "partial",
            Self::Hash => "hash",
            Self::Tokenize => "tokenize",
            Self::Pseudonymize => "pseudonymize",
        })
    }
}

/// Which PII classes are masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionLevel {
    None,
    /// Government and payment identifiers only.
    Low,
    /// Adds contact details.
    #[default]
    Medium,
    /// Every classified field.
    High,
}

impl ProtectionLevel {
    pub fn covers(self, class: PiiClass) -> bool {
        match self {
            Self::None => false,
            Self::Low => matches!(class, PiiClass::Ssn | PiiClass::CreditCard),
            Self::Medium => matches!(
                class,
                PiiClass::Ssn | PiiClass::CreditCard | PiiClass::Email | PiiClass::Phone
            ),
            Self::High => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_nested() {
        let classes = [
            PiiClass::Email,
            PiiClass::Phone,
            PiiClass::Ssn,
            PiiClass::CreditCard,
            PiiClass::Name,
            PiiClass::Other,
        ];
        for class in classes {
            assert!(!ProtectionLevel::None.covers(class));
            if ProtectionLevel::Low.covers(class) {
                assert!(ProtectionLevel::Medium.covers(class));
            }
            if ProtectionLevel::Medium.covers(class) {
                assert!(ProtectionLevel::High.covers(class));
            }
        }
        assert!(!ProtectionLevel::Medium.covers(PiiClass::Name));
    }

    #[test]
    fn parses_class_names() {
        assert_eq!("credit-card".parse::<PiiClass>(), Ok(PiiClass::CreditCard));
        assert_eq!("SSN".parse::<PiiClass>(), Ok(PiiClass::Ssn));
        assert!("passport".parse::<PiiClass>().is_err());
    }
}
