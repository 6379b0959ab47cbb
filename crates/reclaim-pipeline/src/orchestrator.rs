use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use reclaim_model::{
    AuditEvent, BatchMetrics, EscalationReason, PipelineConfig, RawRecord, RecordId,
    RecordVerdict,
};
use reclaim_pii::{Masker, ProtectionPlan, TokenStore};
use reclaim_resilience::{Interruption, ResiliencePolicy};
use reclaim_schema::SchemaRegistry;
use reclaim_validate::RecordValidator;
use tokio::sync::{Semaphore, watch};
use tokio::task::{self, JoinSet};
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::aggregate::Aggregator;
use crate::error::PipelineError;
use crate::output::RunOutput;
use crate::worker::{RecordWorker, Report};

/// A configured run: schema, read-only config snapshot and record worker.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    worker: Arc<RecordWorker>,
    fingerprint: String,
}

impl Pipeline {
    /// Validate the configuration and prepare the run.
    ///
    /// This is the only fallible step; once built, a run always completes
    /// with outputs.
    pub fn new(registry: SchemaRegistry, config: PipelineConfig) -> Result<Self, PipelineError> {
        for warning in config.validate().into_result()? {
            warn!(%warning, "configuration warning");
        }
        let plan = ProtectionPlan::build(registry.fields(), &config.security);
        let fingerprint = registry.fingerprint().to_string();
        let worker = RecordWorker {
            validator: RecordValidator::new(registry, &config.normalization)?,
            plan,
            masker: Masker::new(&config.security),
            policy: ResiliencePolicy::from_config(&config.resilience),
        };
        Ok(Self {
            config,
            worker: Arc::new(worker),
            fingerprint,
        })
    }

    pub fn from_schema_path(path: &Path, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::new(SchemaRegistry::from_path(path)?, config)
    }

    /// Route tokenization through an external store.
    #[must_use]
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        let worker = Arc::make_mut(&mut self.worker);
        worker.masker = worker.masker.clone().with_token_store(tokens);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.worker.validator.registry()
    }

    pub async fn run<I>(&self, records: I) -> RunOutput
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let started = Instant::now();
        let deadline = self.config.processing.timeout().map(|timeout| started + timeout);
        let batch_size = self.config.processing.batch_size.max(1);
        let mut aggregator = Aggregator::new(&self.config, &self.worker.validator);
        let mut records = records.into_iter();
        let mut timed_out = false;

        let mut index = 0;
        loop {
            let batch: Vec<RawRecord> = records.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            let batch_id = BatchMetrics::batch_name(index);
            let span = info_span!("batch", batch_id = %batch_id, records = batch.len());
            timed_out = self
                .run_batch(&batch_id, batch, deadline, timed_out, &mut aggregator)
                .instrument(span)
                .await;
            index += 1;
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let output = aggregator.finish(elapsed_ms, self.fingerprint.clone());
        info!(
            batches = output.summary.batches,
            total = output.summary.total,
            clean = output.summary.clean,
            quarantined = output.summary.quarantined,
            escalated = output.summary.escalated,
            elapsed_ms,
            "run complete"
        );
        output
    }

    /// Process one batch; returns whether the run deadline has expired.
    async fn run_batch(
        &self,
        batch_id: &str,
        batch: Vec<RawRecord>,
        deadline: Option<Instant>,
        mut timed_out: bool,
        aggregator: &mut Aggregator,
    ) -> bool {
        let mut metrics = aggregator.begin_batch(batch_id, batch.len());

        if !timed_out && deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            timed_out = true;
            warn!(remaining = batch.len(), "run deadline expired");
            aggregator.event(AuditEvent::RunTimedOut {
                batch_id: batch_id.to_string(),
                remaining: batch.len(),
            });
        }
        if timed_out || aggregator.is_paused() {
            let reason = if timed_out {
                EscalationReason::TimedOut
            } else {
                EscalationReason::ErrorThresholdPause
            };
            debug!(reason = reason.as_str(), "escalating batch without processing");
            metrics.timed_out = timed_out;
            for (index, raw) in batch.iter().enumerate() {
                aggregator.settle(self.worker.bulk(index, raw, reason), &mut metrics);
            }
            aggregator.close_batch(metrics, false);
            return timed_out;
        }

        let total = batch.len();
        let semaphore = Arc::new(Semaphore::new(self.config.processing.workers.max(1)));
        let (halt_tx, halt_rx) = watch::channel(None::<Interruption>);
        let (settled_tx, settled_rx) = watch::channel(0_usize);
        let mut tasks: JoinSet<Report> = JoinSet::new();
        let mut in_flight: HashMap<task::Id, (usize, RecordId)> = HashMap::new();
        let mut pending: VecDeque<(usize, RawRecord)> = batch.into_iter().enumerate().collect();
        let mut ready: BTreeMap<usize, Report> = BTreeMap::new();
        let mut next = 0;

        while next < total {
            while let Some(report) = ready.remove(&next) {
                if let Some(interruption) = aggregator.settle(report, &mut metrics) {
                    halt_tx.send_replace(Some(interruption));
                }
                next += 1;
                settled_tx.send_replace(next);
            }
            if aggregator.is_circuit_open() && !pending.is_empty() {
                debug!(remaining = pending.len(), "circuit open, admission stopped");
                for (index, raw) in pending.drain(..) {
                    ready.insert(index, self.worker.bulk(index, &raw, EscalationReason::CircuitOpen));
                }
                continue;
            }
            if next == total {
                break;
            }

            tokio::select! {
                biased;

                Some(joined) = tasks.join_next_with_id() => match joined {
                    Ok((id, report)) => {
                        in_flight.remove(&id);
                        ready.insert(report.index, report);
                    }
                    Err(err) => {
                        if let Some((index, record)) = in_flight.remove(&err.id()) {
                            error!(record = %record, error = %err, "record task failed");
                            let verdict = RecordVerdict::bulk_escalated(record, EscalationReason::RetriesExhausted);
                            ready.insert(index, Report::bulk(index, verdict));
                        }
                    }
                },

                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() && !timed_out =>
                {
                    timed_out = true;
                    metrics.timed_out = true;
                    warn!(remaining = pending.len(), in_flight = tasks.len(), "run deadline expired");
                    aggregator.event(AuditEvent::RunTimedOut {
                        batch_id: batch_id.to_string(),
                        remaining: pending.len(),
                    });
                    halt_tx.send_replace(Some(Interruption::TimedOut));
                    for (index, raw) in pending.drain(..) {
                        ready.insert(index, self.worker.bulk(index, &raw, EscalationReason::TimedOut));
                    }
                }

                Ok(permit) = Arc::clone(&semaphore).acquire_owned(), if !pending.is_empty() => {
                    if let Some((index, raw)) = pending.pop_front() {
                        let record = self.worker.validator.record_id(&raw);
                        let worker = Arc::clone(&self.worker);
                        let settled = settled_rx.clone();
                        let halt = halt_rx.clone();
                        let handle = tasks.spawn(async move {
                            let _permit = permit;
                            worker.process(index, raw, settled, halt).await
                        });
                        in_flight.insert(handle.id(), (index, record));
                    }
                }

                else => {
                    error!(settled = next, total, "batch stalled with unsettled records");
                    break;
                }
            }
        }

        aggregator.close_batch(metrics, !timed_out);
        timed_out
    }
}
