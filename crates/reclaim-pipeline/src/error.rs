use reclaim_model::ConfigError;
use reclaim_schema::SchemaError;

/// Failures that stop a run before any record is processed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
