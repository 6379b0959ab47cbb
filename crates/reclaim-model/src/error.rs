use thiserror::Error;

/// Rejection of a configuration snapshot before any record is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },

    #[error("unknown date pattern '{pattern}' (expected a strftime pattern or one of: iso8601, ordinal, east_asian)")]
    UnknownDatePattern { pattern: String },
}
