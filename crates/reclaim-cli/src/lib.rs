//! Library side of the `reclaim` command: config loading, CSV ingest,
//! output writers and logging setup.

pub mod config;
pub mod ingest;
pub mod logging;
pub mod writers;
