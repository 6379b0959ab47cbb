//! Batch metrics, issue log rows and the run summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::issue::IssueCode;
use crate::record::{RecordId, RecordStatus, RecordVerdict};

/// One row of the issue log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLogEntry {
    pub record: RecordId,
    pub field: String,
    pub code: IssueCode,
    pub message: String,
    pub blocking: bool,
}

impl IssueLogEntry {
    /// Issue log rows for every field issue of a verdict, in field order.
    pub fn from_verdict(verdict: &RecordVerdict) -> Vec<Self> {
        verdict
            .issues()
            .map(|(outcome, issue)| Self {
                record: verdict.id.clone(),
                field: outcome.field.clone(),
                code: issue.code,
                message: issue.message.clone(),
                blocking: issue.blocking,
            })
            .collect()
    }
}

/// Per-batch counters. Append-only until [`BatchMetrics::close`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub batch_id: String,
    pub total: usize,
    pub clean: usize,
    pub quarantined: usize,
    pub escalated: usize,
    pub retries: u64,
    pub issue_counts: BTreeMap<IssueCode, usize>,
    /// Share of records that did not come out clean, in `0.0..=1.0`.
    pub error_rate: f64,
    pub circuit_tripped: bool,
    pub threshold_breached: bool,
    pub timed_out: bool,
    #[serde(skip)]
    closed: bool,
}

impl BatchMetrics {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            total: 0,
            clean: 0,
            quarantined: 0,
            escalated: 0,
            retries: 0,
            issue_counts: BTreeMap::new(),
            error_rate: 0.0,
            circuit_tripped: false,
            threshold_breached: false,
            timed_out: false,
            closed: false,
        }
    }

    /// Batch ids are `batch_001`, `batch_002`, ...
    pub fn batch_name(index: usize) -> String {
        format!("batch_{:03}", index + 1)
    }

    pub fn record(&mut self, verdict: &RecordVerdict) {
        debug_assert!(!self.closed, "metrics recorded after close");
        if self.closed {
            return;
        }
        self.total += 1;
        match verdict.status {
            RecordStatus::Clean => self.clean += 1,
            RecordStatus::Quarantined => self.quarantined += 1,
            RecordStatus::Escalated => self.escalated += 1,
        }
        self.retries += u64::from(verdict.retry_count);
        for (_, issue) in verdict.issues() {
            *self.issue_counts.entry(issue.code).or_insert(0) += 1;
        }
    }

    pub fn non_clean(&self) -> usize {
        self.quarantined + self.escalated
    }

    pub fn issue_total(&self) -> usize {
        self.issue_counts.values().sum()
    }

    /// Freeze the counters and compute the error rate.
    pub fn close(&mut self) {
        self.error_rate = if self.total == 0 {
            0.0
        } else {
            self.non_clean() as f64 / self.total as f64
        };
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Totals across all batches of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub batches: usize,
    pub total: usize,
    pub clean: usize,
    pub quarantined: usize,
    pub escalated: usize,
    pub issues: usize,
    /// Percentage of clean records.
    pub success_rate: f64,
    pub elapsed_ms: u64,
    pub records_per_second: f64,
}

impl RunSummary {
    pub fn from_batches(batches: &[BatchMetrics], elapsed_ms: u64) -> Self {
        let total: usize = batches.iter().map(|b| b.total).sum();
        let clean: usize = batches.iter().map(|b| b.clean).sum();
        let success_rate = if total == 0 {
            0.0
        } else {
            clean as f64 / total as f64 * 100.0
        };
        let records_per_second = if elapsed_ms == 0 {
            0.0
        } else {
            total as f64 / (elapsed_ms as f64 / 1000.0)
        };
        Self {
            batches: batches.len(),
            total,
            clean,
            quarantined: batches.iter().map(|b| b.quarantined).sum(),
            escalated: batches.iter().map(|b| b.escalated).sum(),
            issues: batches.iter().map(BatchMetrics::issue_total).sum(),
            success_rate,
            elapsed_ms,
            records_per_second,
        }
    }
}
