use std::path::PathBuf;

/// Malformed schema source. Fatal: the run stops before any record is processed.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema CSV: {message}")]
    Csv { message: String },

    #[error("failed to parse schema TOML: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported schema file extension for {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("schema defines no fields")]
    Empty,

    #[error("field entry {position} has no name")]
    MissingName { position: usize },

    #[error("field '{field}' has no semantic type")]
    MissingType { field: String },

    #[error("field '{field}' has unknown semantic type '{value}'")]
    UnknownType { field: String, value: String },

    #[error("duplicate field name '{field}'")]
    DuplicateField { field: String },

    #[error("field '{field}' has invalid required flag '{value}'")]
    InvalidRequired { field: String, value: String },

    #[error("field '{field}' uses unknown validation-rule token '{token}'")]
    UnknownRuleToken { field: String, token: String },

    #[error("field '{field}' has invalid value for rule token '{token}': {message}")]
    InvalidRuleValue {
        field: String,
        token: String,
        message: String,
    },

    #[error("field '{field}' of type {semantic_type} requires rule token '{token}'")]
    MissingRuleToken {
        field: String,
        semantic_type: String,
        token: String,
    },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Lookup of a field name the schema does not define.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{name}'")]
pub struct UnknownFieldError {
    pub name: String,
}
