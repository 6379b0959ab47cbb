use std::sync::Arc;

use reclaim_model::{AuditEvent, EscalationReason, RawRecord, RecordVerdict};
use reclaim_pii::{Masker, ProtectionPlan};
use reclaim_resilience::{Disposition, Interruption, RecordState, ResiliencePolicy};
use reclaim_validate::{RecordValidator, provisional_status};
use tokio::sync::watch;
use tracing::debug;

/// A worker's result for one record, tagged with its position in the batch.
#[derive(Debug)]
pub(crate) struct Report {
    pub index: usize,
    pub verdict: RecordVerdict,
    /// Retry events, replayed in input order by the aggregator.
    pub events: Vec<AuditEvent>,
}

impl Report {
    pub fn bulk(index: usize, verdict: RecordVerdict) -> Self {
        Self {
            index,
            verdict,
            events: Vec::new(),
        }
    }
}

/// Read-only per-record work shared by all tasks of a run.
#[derive(Debug, Clone)]
pub(crate) struct RecordWorker {
    pub validator: RecordValidator,
    pub plan: ProtectionPlan,
    pub masker: Masker,
    pub policy: ResiliencePolicy,
}

impl RecordWorker {
    /// One attempt: validate, then mask under the protection plan.
    pub fn attempt(&self, raw: &RawRecord) -> RecordVerdict {
        let mut verdict = self.validator.validate(raw);
        if !self.plan.is_empty() {
            self.plan.apply(&self.masker, &mut verdict);
        }
        verdict.status = provisional_status(&verdict.outcomes, self.validator.quarantine_optional());
        verdict
    }

    /// Attempt a record, backing off between retries until it settles or
    /// the batch is halted.
    ///
    /// A record may only retry once every earlier record of the batch has
    /// settled (`settled` reaches `index`). Until then the breaker state it
    /// depends on is unknown, so a later record never spends retry budget
    /// ahead of a trip. A halted record finishes its current attempt and
    /// carries the interruption as its escalation reason.
    pub async fn process(
        self: Arc<Self>,
        index: usize,
        raw: RawRecord,
        mut settled: watch::Receiver<usize>,
        mut halt: watch::Receiver<Option<Interruption>>,
    ) -> Report {
        let mut events = Vec::new();
        let mut state = RecordState::Pending;
        loop {
            let mut verdict = self.attempt(&raw);
            verdict.retry_count = state.retries();

            let disposition = self.policy.next_step(&verdict);
            state = state.apply(disposition);
            let Disposition::Retry { delay } = disposition else {
                return Report {
                    index,
                    verdict,
                    events,
                };
            };

            if let Some(interruption) = wait_for_turn(index, &mut settled, &mut halt).await {
                return interrupted(index, verdict, events, state, interruption);
            }

            let attempt = state.retries();
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            debug!(record = %verdict.id, attempt, delay_ms, "retry scheduled");
            events.push(AuditEvent::RetryScheduled {
                record: verdict.id.clone(),
                attempt,
                delay_ms,
            });

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = halt.changed() => {}
            }

            let halted = *halt.borrow();
            if let Some(interruption) = halted {
                debug!(record = %verdict.id, %interruption, "retry interrupted");
                return interrupted(index, verdict, events, state, interruption);
            }
        }
    }

    pub fn bulk(&self, index: usize, raw: &RawRecord, reason: EscalationReason) -> Report {
        Report::bulk(
            index,
            RecordVerdict::bulk_escalated(self.validator.record_id(raw), reason),
        )
    }
}

/// Block until every earlier record has settled, or the batch is halted.
async fn wait_for_turn(
    index: usize,
    settled: &mut watch::Receiver<usize>,
    halt: &mut watch::Receiver<Option<Interruption>>,
) -> Option<Interruption> {
    loop {
        let halted = *halt.borrow();
        if halted.is_some() {
            return halted;
        }
        if *settled.borrow() >= index {
            return None;
        }
        let changed = tokio::select! {
            changed = settled.changed() => changed,
            changed = halt.changed() => changed,
        };
        if changed.is_err() {
            return *halt.borrow();
        }
    }
}

fn interrupted(
    index: usize,
    mut verdict: RecordVerdict,
    events: Vec<AuditEvent>,
    state: RecordState,
    interruption: Interruption,
) -> Report {
    if let RecordState::Escalated(reason) = state.interrupt(interruption) {
        verdict.escalation = Some(reason);
    }
    Report {
        index,
        verdict,
        events,
    }
}
