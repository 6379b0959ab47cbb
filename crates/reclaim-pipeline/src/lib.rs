//! Batch orchestration.
//!
//! [`Pipeline::run`] splits the input into batches, validates and masks
//! records on a bounded tokio worker pool, and settles every verdict on a
//! single aggregation path in input order. The circuit breaker, batch
//! metrics, duplicate-id tracking and the pseudonym ledger are only touched
//! on that path.

mod aggregate;
mod error;
mod orchestrator;
mod output;
mod worker;

pub use error::PipelineError;
pub use orchestrator::Pipeline;
pub use output::RunOutput;
