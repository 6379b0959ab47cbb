//! Resilience controller.
//!
//! Decides per record whether a failure is retried, quarantined or
//! escalated, and keeps the per-batch circuit breaker. Everything here is
//! single-owner and synchronous: the orchestrator drives it from one
//! serialized aggregation path, and workers only consult the pure
//! [`ResiliencePolicy`].

pub mod circuit;
pub mod controller;
pub mod interruption;
pub mod policy;
pub mod retry;
pub mod state;
pub mod threshold;

pub use circuit::CircuitState;
pub use controller::{Finalization, ResilienceController};
pub use interruption::Interruption;
pub use policy::{Disposition, ResiliencePolicy};
pub use retry::RetryPolicy;
pub use state::RecordState;
pub use threshold::ErrorThreshold;
