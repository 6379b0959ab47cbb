//! Per-schema protection plan.

use reclaim_model::{
    FieldIssue, FieldSpec, FieldValue, IssueCode, MaskingStrategy, PiiClass, RecordVerdict,
    SecurityConfig,
};
use tracing::{debug, warn};

use crate::classify::classify;
use crate::mask::Masker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedField {
    pub field: String,
    pub class: PiiClass,
    pub strategy: MaskingStrategy,
}

/// Fields to mask under the configured protection level, in schema order.
#[derive(Debug, Clone, Default)]
pub struct ProtectionPlan {
    fields: Vec<ProtectedField>,
}

impl ProtectionPlan {
    pub fn build(fields: &[FieldSpec], security: &SecurityConfig) -> Self {
        let fields: Vec<ProtectedField> = fields
            .iter()
            .filter_map(|spec| {
                let class = classify(spec)?;
                if !security.protection_level.covers(class) {
                    debug!(field = %spec.name, %class, "PII class not covered by protection level");
                    return None;
                }
                Some(ProtectedField {
                    field: spec.name.clone(),
                    class,
                    strategy: security.strategies.for_class(class),
                })
            })
            .collect();
        debug!(protected = fields.len(), "protection plan built");
        Self { fields }
    }

    pub fn fields(&self) -> &[ProtectedField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&ProtectedField> {
        self.fields.iter().find(|p| p.field == field)
    }

    /// Mask validated values in place and return the number of masking failures.
    ///
    /// Fields that already carry an issue, or have no value, are left alone.
    /// A failure drops the value and attaches a blocking `MaskingFailed` issue.
    pub fn apply(&self, masker: &Masker, verdict: &mut RecordVerdict) -> usize {
        let mut failures = 0;
        for outcome in &mut verdict.outcomes {
            let Some(protected) = self.get(&outcome.field) else {
                continue;
            };
            if outcome.issue.is_some() || outcome.masked {
                continue;
            }
            let Some(value) = outcome.value.as_ref().map(ToString::to_string) else {
                continue;
            };
            match masker.mask(&value, protected.class, protected.strategy) {
                Ok(masked) => {
                    outcome.value = Some(FieldValue::Text(masked.value));
                    outcome.pseudonym = masked.pseudonym;
                    outcome.masked = true;
                }
                Err(err) => {
                    warn!(
                        record = %verdict.id,
                        field = %outcome.field,
                        error = %err,
                        transient = err.is_transient(),
                        "masking failed"
                    );
                    outcome.value = None;
                    outcome.issue = Some(FieldIssue::blocking(IssueCode::MaskingFailed, err.to_string()));
                    failures += 1;
                }
            }
        }
        failures
    }
}
