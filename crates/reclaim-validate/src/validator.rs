use reclaim_model::{
    ConfigError, FieldIssue, FieldOutcome, FieldSpec, FieldValue, InvalidValuePolicy, IssueCode,
    NormalizationConfig, RawRecord, RecordId, RecordVerdict, SemanticType,
};
use reclaim_normalize::Normalizer;
use reclaim_schema::SchemaRegistry;
use tracing::trace;

use crate::status::provisional_status;

/// Validates raw records against the schema. Read-only after construction.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    registry: SchemaRegistry,
    normalizer: Normalizer,
    policy: InvalidValuePolicy,
    quarantine_optional: bool,
    identity_column: Option<String>,
}

impl RecordValidator {
    pub fn new(registry: SchemaRegistry, config: &NormalizationConfig) -> Result<Self, ConfigError> {
        let identity_column = registry
            .identity_field()
            .map(|spec| spec.source_column().to_string());
        Ok(Self {
            normalizer: Normalizer::new(config)?,
            policy: config.invalid_value_policy,
            quarantine_optional: config.quarantine_optional_issues,
            identity_column,
            registry,
        })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn quarantine_optional(&self) -> bool {
        self.quarantine_optional
    }

    /// Identity of a raw record: its row plus the raw identity-field value.
    pub fn record_id(&self, raw: &RawRecord) -> RecordId {
        let key = self
            .identity_column
            .as_deref()
            .and_then(|column| raw.get(column))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        RecordId::new(raw.row).with_key(key)
    }

    pub fn validate(&self, raw: &RawRecord) -> RecordVerdict {
        let outcomes: Vec<FieldOutcome> = self
            .registry
            .fields()
            .iter()
            .map(|spec| self.validate_field(raw, spec))
            .collect();
        let status = provisional_status(&outcomes, self.quarantine_optional);
        let verdict = RecordVerdict {
            id: self.record_id(raw),
            outcomes,
            status,
            retry_count: 0,
            escalation: None,
        };
        trace!(
            record = %verdict.id,
            %status,
            issues = verdict.issue_count(),
            "record validated"
        );
        verdict
    }

    fn validate_field(&self, raw: &RawRecord, spec: &FieldSpec) -> FieldOutcome {
        let input = raw.get(spec.source_column());
        let absent = input.is_none_or(|value| value.trim().is_empty());
        let normalized = self.normalizer.normalize(input, spec);
        match (normalized.issue, normalized.value) {
            (None, Some(value)) => FieldOutcome::valid(&spec.name, spec.required, value),
            // Nothing usable to fall back on: the default itself failed.
            (Some(_), _) if spec.required && absent => FieldOutcome::failed(
                &spec.name,
                true,
                None,
                FieldIssue::blocking(
                    IssueCode::MissingRequired,
                    "required field is empty and its default is unusable",
                ),
            ),
            (None, None) if spec.required => FieldOutcome::failed(
                &spec.name,
                true,
                None,
                FieldIssue::blocking(IssueCode::MissingRequired, "required field is empty"),
            ),
            (None, None) => FieldOutcome::empty(&spec.name, false),
            (Some(issue), value) => self.apply_policy(spec, issue, value),
        }
    }

    /// The single rule for values that failed to normalize.
    fn apply_policy(
        &self,
        spec: &FieldSpec,
        mut issue: FieldIssue,
        value: Option<FieldValue>,
    ) -> FieldOutcome {
        let value = match self.policy {
            InvalidValuePolicy::SetNull => value,
            InvalidValuePolicy::UseDefault => self.fallback(spec).or(value),
            InvalidValuePolicy::Block => {
                if spec.required {
                    issue.blocking = true;
                }
                value
            }
        };
        FieldOutcome::failed(&spec.name, spec.required, value, issue)
    }

    /// Field default, or zero for currency.
    fn fallback(&self, spec: &FieldSpec) -> Option<FieldValue> {
        if let Some(default) = spec.rule.default.as_deref() {
            let normalized = self.normalizer.normalize(Some(default), spec);
            if normalized.is_ok() {
                return normalized.value;
            }
        }
        match spec.semantic_type {
            SemanticType::Currency => Some(FieldValue::MinorUnits(0)),
            _ => None,
        }
    }
}
