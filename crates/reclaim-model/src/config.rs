//! Read-only configuration snapshot for a pipeline run.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. [`PipelineConfig::validate`] checks business rules before
//! any record is processed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pii::{MaskingStrategy, PiiClass, ProtectionLevel};
use crate::schema::PhoneCountry;

/// Placeholder masking key; runs using it get a warning.
pub const DEFAULT_MASKING_KEY: &str = "reclaim-development-key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub processing: ProcessingConfig,
    pub resilience: ResilienceConfig,
    pub normalization: NormalizationConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub batch_size: usize,
    /// Non-clean records tolerated per batch before pause-and-report.
    pub max_errors_per_batch: usize,
    /// Non-clean percentage tolerated per batch before pause-and-report.
    pub error_threshold_percent: f64,
    pub workers: usize,
    /// Whole-run deadline.
    pub timeout_secs: Option<u64>,
    /// Escalate the batches after a threshold breach instead of processing them.
    pub pause_on_error_threshold: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_errors_per_batch: 50,
            error_threshold_percent: 5.0,
            workers: 4,
            timeout_secs: None,
            pause_on_error_threshold: true,
        }
    }
}

impl ProcessingConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_multiplier: f64,
    /// Consecutive non-recoverable failures that open the circuit.
    pub circuit_breaker_threshold: u32,
    /// Recoverable issues a record may carry and still be quarantined.
    pub max_issues_per_record: usize,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 100,
            backoff_multiplier: 2.0,
            circuit_breaker_threshold: 5,
            max_issues_per_record: 5,
        }
    }
}

/// What happens to a field whose non-empty raw value fails to normalize.
///
/// Applied by the validator to every field alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidValuePolicy {
    /// The value becomes null and the issue is recoverable.
    #[default]
    SetNull,
    /// The value falls back to the field default (currency: 0).
    UseDefault,
    /// On required fields the issue blocks the record like missing data.
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Date matchers in priority order: strftime patterns or
    /// `iso8601`, `ordinal`, `east_asian`.
    pub date_formats: Vec<String>,
    pub currency_precision: u32,
    pub phone_country: PhoneCountry,
    pub invalid_value_policy: InvalidValuePolicy,
    /// Quarantine records whose only issues sit on optional fields.
    pub quarantine_optional_issues: bool,
    pub min_year: i32,
    pub max_year: i32,
}

impl NormalizationConfig {
    pub fn default_date_formats() -> Vec<String> {
        [
            "iso8601", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%d-%m-%Y", "%m-%d-%Y",
            "%d.%m.%Y", "%b %d %Y", "%b %d, %Y", "%d %b %Y", "%B %d %Y", "%B %d, %Y",
            "%d %B %Y", "%d-%b-%Y", "%d-%b-%y", "%Y%m%d", "ordinal", "east_asian",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            date_formats: Self::default_date_formats(),
            currency_precision: 2,
            phone_country: PhoneCountry::Us,
            invalid_value_policy: InvalidValuePolicy::SetNull,
            quarantine_optional_issues: false,
            min_year: 1900,
            max_year: 2100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingStrategies {
    pub email: MaskingStrategy,
    pub phone: MaskingStrategy,
    pub ssn: MaskingStrategy,
    pub credit_card: MaskingStrategy,
    pub name: MaskingStrategy,
    pub other: MaskingStrategy,
}

impl Default for MaskingStrategies {
    fn default() -> Self {
        Self {
            email: MaskingStrategy::Partial,
            phone: MaskingStrategy::Partial,
            ssn: MaskingStrategy::Hash,
            credit_card: MaskingStrategy::Tokenize,
            name: MaskingStrategy::Pseudonymize,
            other: MaskingStrategy::Hash,
        }
    }
}

impl MaskingStrategies {
    pub fn for_class(&self, class: PiiClass) -> MaskingStrategy {
        match class {
            PiiClass::Email => self.email,
            PiiClass::Phone => self.phone,
            PiiClass::Ssn => self.ssn,
            PiiClass::CreditCard => self.credit_card,
            PiiClass::Name => self.name,
            PiiClass::Other => self.other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub protection_level: ProtectionLevel,
    /// Secret mixed into hashes, tokens and pseudonyms.
    pub key: String,
    /// Characters revealed at each end by partial masking.
    pub reveal: usize,
    pub strategies: MaskingStrategies,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            protection_level: ProtectionLevel::Medium,
            key: DEFAULT_MASKING_KEY.to_string(),
            reveal: 2,
            strategies: MaskingStrategies::default(),
        }
    }
}

/// Outcome of [`PipelineConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn a report with errors into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<String>, ConfigError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ConfigError::Invalid {
                errors: self.errors,
            })
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();
        let processing = &self.processing;
        let resilience = &self.resilience;
        let normalization = &self.normalization;

        if processing.batch_size == 0 {
            report.errors.push("batch size must be positive".to_string());
        } else if processing.batch_size > 10_000 {
            report
                .warnings
                .push("large batch size may cause memory issues".to_string());
        }
        if processing.workers == 0 {
            report.errors.push("worker count must be positive".to_string());
        } else if let Ok(cpus) = std::thread::available_parallelism()
            && processing.workers > cpus.get()
        {
            report.warnings.push(format!(
                "worker count ({}) exceeds available parallelism ({cpus})",
                processing.workers
            ));
        }
        if !(0.0..=100.0).contains(&processing.error_threshold_percent) {
            report
                .errors
                .push("error threshold percentage must be within 0..=100".to_string());
        }
        if processing.timeout_secs == Some(0) {
            report.errors.push("timeout must be positive when set".to_string());
        }

        if resilience.max_retries > 10 {
            report
                .warnings
                .push("high retry count may cause performance issues".to_string());
        }
        if !resilience.backoff_multiplier.is_finite() || resilience.backoff_multiplier < 1.0 {
            report
                .errors
                .push("backoff multiplier must be a finite number >= 1.0".to_string());
        }
        if resilience.circuit_breaker_threshold == 0 {
            report
                .errors
                .push("circuit breaker threshold must be positive".to_string());
        }

        if normalization.date_formats.is_empty() {
            report
                .errors
                .push("at least one date input format is required".to_string());
        }
        if normalization.currency_precision > 6 {
            report
                .errors
                .push("currency precision must be at most 6".to_string());
        }
        if normalization.min_year > normalization.max_year {
            report
                .errors
                .push("min_year must not exceed max_year".to_string());
        }

        if self.security.protection_level != ProtectionLevel::None {
            if self.security.key.is_empty() {
                report
                    .errors
                    .push("masking key must not be empty when PII protection is enabled".to_string());
            } else if self.security.key == DEFAULT_MASKING_KEY {
                report
                    .warnings
                    .push("using the built-in development masking key".to_string());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        let report = config.validate();
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.contains("development masking key"))
        );
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: PipelineConfig = toml::from_str("").expect("parse empty config");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [processing]
            batch_size = 10
            workers = 2

            [normalization]
            invalid_value_policy = "block"
            phone_country = "GB"

            [security]
            protection_level = "high"
            key = "s3cret"

            [security.strategies]
            email = "hash"
            "#,
        )
        .expect("parse config");
        assert_eq!(config.processing.batch_size, 10);
        assert_eq!(config.processing.max_errors_per_batch, 50);
        assert_eq!(
            config.normalization.invalid_value_policy,
            InvalidValuePolicy::Block
        );
        assert_eq!(config.normalization.phone_country, PhoneCountry::Gb);
        assert_eq!(config.security.protection_level, ProtectionLevel::High);
        assert_eq!(
            config.security.strategies.for_class(PiiClass::Email),
            MaskingStrategy::Hash
        );
        assert_eq!(
            config.security.strategies.for_class(PiiClass::Name),
            MaskingStrategy::Pseudonymize
        );
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.processing.batch_size = 0;
        config.processing.workers = 0;
        config.resilience.backoff_multiplier = 0.5;
        config.security.key.clear();
        let report = config.validate();
        assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
        assert!(matches!(
            report.into_result(),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
