use reclaim_model::{MaskingStrategy, PiiClass};

/// Failure of the external token store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token store unavailable: {message}")]
    Unavailable { message: String },

    #[error("token store is not configured with a key")]
    MissingKey,
}

/// Masking failure. Fatal to the field, never silently skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    #[error("failed to tokenize {class} value: {source}")]
    Token {
        class: PiiClass,
        #[source]
        source: TokenError,
    },

    #[error("cannot apply {strategy} masking to an empty {class} value")]
    EmptyValue {
        class: PiiClass,
        strategy: MaskingStrategy,
    },

    #[error("masking key is empty")]
    MissingKey,
}

impl MaskError {
    /// Transient failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Token {
                source: TokenError::Unavailable { .. },
                ..
            }
        )
    }
}
