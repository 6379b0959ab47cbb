//! The serialized aggregation path.

use std::collections::HashSet;

use chrono::Utc;
use reclaim_model::{
    AuditEvent, BatchMetrics, FieldIssue, FieldValue, IssueCode, IssueLogEntry, PipelineConfig,
    RecordStatus, RecordVerdict, RunSummary,
};
use reclaim_pii::PseudonymLedger;
use reclaim_resilience::{ErrorThreshold, Interruption, ResilienceController};
use reclaim_validate::{RecordValidator, provisional_status};
use tracing::{info, warn};

use crate::output::RunOutput;
use crate::worker::Report;

/// Single owner of all run-scoped mutable state.
///
/// Reports must be settled in input order.
#[derive(Debug)]
pub(crate) struct Aggregator {
    controller: ResilienceController,
    threshold: ErrorThreshold,
    pause_on_threshold: bool,
    paused: bool,
    ledger: PseudonymLedger,
    seen_ids: HashSet<i64>,
    identity_field: Option<String>,
    quarantine_optional: bool,
    clean: Vec<RecordVerdict>,
    quarantined: Vec<RecordVerdict>,
    escalated: Vec<RecordVerdict>,
    issues: Vec<IssueLogEntry>,
    batches: Vec<BatchMetrics>,
    events: Vec<AuditEvent>,
}

impl Aggregator {
    pub fn new(config: &PipelineConfig, validator: &RecordValidator) -> Self {
        Self {
            controller: ResilienceController::new(&config.resilience),
            threshold: ErrorThreshold::from_config(&config.processing),
            pause_on_threshold: config.processing.pause_on_error_threshold,
            paused: false,
            ledger: PseudonymLedger::new(config.security.key.clone()),
            seen_ids: HashSet::new(),
            identity_field: validator.registry().identity_field().map(|f| f.name.clone()),
            quarantine_optional: validator.quarantine_optional(),
            clean: Vec::new(),
            quarantined: Vec::new(),
            escalated: Vec::new(),
            issues: Vec::new(),
            batches: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_circuit_open(&self) -> bool {
        self.controller.is_open()
    }

    pub fn event(&mut self, event: AuditEvent) {
        self.events.push(event);
    }

    pub fn begin_batch(&mut self, batch_id: &str, records: usize) -> BatchMetrics {
        self.controller.begin_batch();
        self.events.push(AuditEvent::BatchStarted {
            batch_id: batch_id.to_string(),
            records,
        });
        BatchMetrics::new(batch_id)
    }

    /// Settle one record. Returns the interruption to broadcast when this
    /// record tripped the circuit breaker.
    pub fn settle(&mut self, report: Report, metrics: &mut BatchMetrics) -> Option<Interruption> {
        let Report {
            mut verdict, events, ..
        } = report;

        // An open breaker replaces the verdict, so its retries never count.
        if !self.controller.is_open() {
            self.events.extend(events);
            self.resolve_pseudonyms(&mut verdict);
            if verdict.escalation.is_none() {
                self.flag_duplicate(&mut verdict);
                verdict.status = provisional_status(&verdict.outcomes, self.quarantine_optional);
            }
        }

        let settled = self.controller.finalize(&mut verdict);
        let mut tripped = None;
        if settled.circuit_opened {
            metrics.circuit_tripped = true;
            let circuit = self.controller.circuit();
            self.events.push(AuditEvent::CircuitOpened {
                batch_id: metrics.batch_id.clone(),
                consecutive_failures: circuit.consecutive_failures(),
                at: circuit.last_trip().unwrap_or_else(Utc::now),
            });
            tripped = Some(Interruption::CircuitOpen);
        }

        match (settled.status, settled.escalation) {
            (RecordStatus::Escalated, Some(reason)) => {
                self.events.push(AuditEvent::escalated(verdict.id.clone(), reason));
            }
            (RecordStatus::Quarantined, _) => {
                self.events.push(AuditEvent::RecordQuarantined {
                    record: verdict.id.clone(),
                    codes: verdict.issues().map(|(_, issue)| issue.code).collect(),
                });
            }
            _ => {}
        }

        metrics.record(&verdict);
        self.issues.extend(IssueLogEntry::from_verdict(&verdict));
        match verdict.status {
            RecordStatus::Clean => self.clean.push(verdict),
            RecordStatus::Quarantined => self.quarantined.push(verdict),
            RecordStatus::Escalated => self.escalated.push(verdict),
        }
        tripped
    }

    /// Freeze batch metrics; `evaluate` checks the error threshold.
    pub fn close_batch(&mut self, mut metrics: BatchMetrics, evaluate: bool) {
        metrics.close();
        if evaluate && self.threshold.breached(&metrics) {
            metrics.threshold_breached = true;
            warn!(
                batch_id = %metrics.batch_id,
                error_rate = metrics.error_rate,
                non_clean = metrics.non_clean(),
                pause = self.pause_on_threshold,
                "error threshold breached"
            );
            self.events.push(AuditEvent::ErrorThresholdBreached {
                batch_id: metrics.batch_id.clone(),
                error_rate: metrics.error_rate,
                non_clean: metrics.non_clean(),
            });
            if self.pause_on_threshold {
                self.paused = true;
            }
        }
        info!(
            batch_id = %metrics.batch_id,
            total = metrics.total,
            clean = metrics.clean,
            quarantined = metrics.quarantined,
            escalated = metrics.escalated,
            "batch closed"
        );
        self.events.push(AuditEvent::BatchClosed {
            batch_id: metrics.batch_id.clone(),
            clean: metrics.clean,
            quarantined: metrics.quarantined,
            escalated: metrics.escalated,
        });
        self.batches.push(metrics);
    }

    pub fn finish(self, elapsed_ms: u64, schema_fingerprint: String) -> RunOutput {
        RunOutput {
            summary: RunSummary::from_batches(&self.batches, elapsed_ms),
            clean: self.clean,
            quarantined: self.quarantined,
            escalated: self.escalated,
            issues: self.issues,
            batches: self.batches,
            events: self.events,
            schema_fingerprint,
        }
    }

    /// A later record repeating an earlier integer id gets a recoverable issue.
    fn flag_duplicate(&mut self, verdict: &mut RecordVerdict) {
        let Some(field) = self.identity_field.as_deref() else {
            return;
        };
        let Some(outcome) = verdict.outcomes.iter_mut().find(|o| o.field == field) else {
            return;
        };
        if outcome.issue.is_some() {
            return;
        }
        let Some(FieldValue::Integer(id)) = outcome.value else {
            return;
        };
        if !self.seen_ids.insert(id) {
            outcome.issue = Some(FieldIssue::new(
                IssueCode::DuplicateIdentifier,
                "identifier already used by an earlier record",
            ));
        }
    }

    fn resolve_pseudonyms(&mut self, verdict: &mut RecordVerdict) {
        for outcome in &mut verdict.outcomes {
            if let Some(claim) = &outcome.pseudonym {
                outcome.value = Some(FieldValue::Text(self.ledger.resolve(claim)));
            }
        }
    }
}
