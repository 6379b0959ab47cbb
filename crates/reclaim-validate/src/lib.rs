//! Record validation.
//!
//! [`RecordValidator::validate`] walks the schema in order, normalizes each
//! field and folds the outcomes into a [`RecordVerdict`](reclaim_model::RecordVerdict)
//! with a provisional status. Per-field problems never propagate as errors;
//! the resilience controller finalizes the status.

mod status;
mod validator;

pub use status::provisional_status;
pub use validator::RecordValidator;
