//! Token store seam.

use std::fmt;

use reclaim_model::PiiClass;

use crate::digest::keyed_hex;
use crate::error::TokenError;

/// External secure store that issues opaque tokens.
///
/// Only the store can map a token back to its value; the pipeline never
/// sees or keeps the reverse mapping.
pub trait TokenStore: Send + Sync + fmt::Debug {
    fn tokenize(&self, class: PiiClass, value: &str) -> Result<String, TokenError>;
}

/// Store that derives tokens from a keyed digest and holds no mapping.
///
/// Tokens look like `TOKEN_CREDIT_CARD_3f9a0c1b2d4e5f60`.
pub struct KeyedTokenStore {
    key: String,
}

impl KeyedTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Debug for KeyedTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedTokenStore")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenStore for KeyedTokenStore {
    fn tokenize(&self, class: PiiClass, value: &str) -> Result<String, TokenError> {
        if self.key.is_empty() {
            return Err(TokenError::MissingKey);
        }
        let digest = keyed_hex(&self.key, &[b"token", class.as_str().as_bytes(), value.as_bytes()]);
        Ok(format!("TOKEN_{class}_{}", &digest[..16]))
    }
}
