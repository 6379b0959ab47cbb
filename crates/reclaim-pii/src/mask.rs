//! Masking strategies.

use std::fmt;
use std::sync::Arc;

use reclaim_model::{MaskingStrategy, PiiClass, PseudonymClaim, SecurityConfig};

use crate::digest::keyed_hex;
use crate::error::MaskError;
use crate::pseudonym::surrogate;
use crate::token::{KeyedTokenStore, TokenStore};

const REDACTION: char = '*';

/// A masked value, plus the pseudonym claim when one was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masked {
    pub value: String,
    pub pseudonym: Option<PseudonymClaim>,
}

impl Masked {
    fn plain(value: String) -> Self {
        Self {
            value,
            pseudonym: None,
        }
    }
}

/// Applies masking strategies with a secret key.
///
/// Stateless apart from the token store handle; pseudonym collisions are
/// settled later by a [`PseudonymLedger`](crate::PseudonymLedger).
#[derive(Clone)]
pub struct Masker {
    key: String,
    reveal: usize,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for Masker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Masker")
            .field("key", &"[REDACTED]")
            .field("reveal", &self.reveal)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl Masker {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            key: security.key.clone(),
            reveal: security.reveal,
            tokens: Arc::new(KeyedTokenStore::new(security.key.clone())),
        }
    }

    #[must_use]
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn mask(
        &self,
        value: &str,
        class: PiiClass,
        strategy: MaskingStrategy,
    ) -> Result<Masked, MaskError> {
        if value.is_empty() {
            return Err(MaskError::EmptyValue { class, strategy });
        }
        match strategy {
            MaskingStrategy::Partial => Ok(Masked::plain(self.partial(value, class))),
            MaskingStrategy::Hash => self.hash(value, class).map(Masked::plain),
            MaskingStrategy::Tokenize => self
                .tokens
                .tokenize(class, value)
                .map(Masked::plain)
                .map_err(|source| MaskError::Token { class, source }),
            MaskingStrategy::Pseudonymize => self.pseudonymize(value, class),
        }
    }

    fn hash(&self, value: &str, class: PiiClass) -> Result<String, MaskError> {
        if self.key.is_empty() {
            return Err(MaskError::MissingKey);
        }
        let digest = keyed_hex(&self.key, &[b"hash", class.as_str().as_bytes(), value.as_bytes()]);
        Ok(format!("HASH_{}", &digest[..12]))
    }

    fn pseudonymize(&self, value: &str, class: PiiClass) -> Result<Masked, MaskError> {
        if self.key.is_empty() {
            return Err(MaskError::MissingKey);
        }
        let digest = keyed_hex(
            &self.key,
            &[b"input", class.as_str().as_bytes(), value.as_bytes()],
        );
        let claim = PseudonymClaim {
            class,
            digest,
            round: 0,
        };
        Ok(Masked {
            value: surrogate(&self.key, class, &claim.digest, claim.round),
            pseudonym: Some(claim),
        })
    }

    fn partial(&self, value: &str, class: PiiClass) -> String {
        match class {
            PiiClass::Email => partial_email(value).unwrap_or_else(|| reveal_ends(value, self.reveal)),
            PiiClass::Phone => partial_phone(value).unwrap_or_else(|| reveal_ends(value, self.reveal)),
            PiiClass::Name => partial_name(value),
            PiiClass::Ssn | PiiClass::CreditCard | PiiClass::Other => {
                reveal_ends(value, self.reveal)
            }
        }
    }
}

/// Keep `reveal` characters at each end; short values are fully redacted.
fn reveal_ends(value: &str, reveal: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= reveal * 2 {
        return REDACTION.to_string().repeat(chars.len());
    }
    let hidden = chars.len() - reveal * 2;
    chars[..reveal]
        .iter()
        .chain(std::iter::repeat_n(&REDACTION, hidden))
        .chain(&chars[chars.len() - reveal..])
        .collect()
}

/// `amar.singh@example.com` -> `a***h@example.com`
fn partial_email(value: &str) -> Option<String> {
    let (local, domain) = value.rsplit_once('@')?;
    let mut chars = local.chars();
    let first = chars.next()?;
    Some(match chars.last() {
        Some(last) => format!("{first}***{last}@{domain}"),
        None => format!("{first}***@{domain}"),
    })
}

/// `5551234567` -> `(555) ***-**67`
fn partial_phone(value: &str) -> Option<String> {
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("({}) ***-**{}", &value[..3], &value[8..]))
}

/// `Amar Singh` -> `Amar S***`
fn partial_name(value: &str) -> String {
    let mut words = value.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };
    words.fold(first.to_string(), |mut out, word| {
        out.push(' ');
        if let Some(initial) = word.chars().next() {
            out.push(initial);
        }
        out.push_str("***");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;

    fn masker() -> Masker {
        Masker::new(&SecurityConfig {
            key: "test-key".to_string(),
            ..SecurityConfig::default()
        })
    }

    fn partial(value: &str, class: PiiClass) -> String {
        masker()
            .mask(value, class, MaskingStrategy::Partial)
            .expect("partial mask")
            .value
    }

    #[test]
    fn partial_by_class() {
        assert_eq!(partial("amar.singh@example.com", PiiClass::Email), "a***h@example.com");
        assert_eq!(partial("5551234567", PiiClass::Phone), "(555) ***-**67");
        assert_eq!(partial("Amar Singh", PiiClass::Name), "Amar S***");
        assert_eq!(partial("123-45-6789", PiiClass::Ssn), "12*******89");
        assert_eq!(partial("abcd", PiiClass::Other), "****");
        assert_eq!(partial("5551234", PiiClass::Phone), "55***34");
    }

    #[test]
    fn hash_is_deterministic_and_keyed() {
        let a = masker().mask("123-45-6789", PiiClass::Ssn, MaskingStrategy::Hash).expect("hash");
        let b = masker().mask("123-45-6789", PiiClass::Ssn, MaskingStrategy::Hash).expect("hash");
        assert_eq!(a, b);
        assert!(a.value.starts_with("HASH_"));
        assert_eq!(a.value.len(), 17);

        let other = Masker::new(&SecurityConfig {
            key: "other-key".to_string(),
            ..SecurityConfig::default()
        });
        let c = other.mask("123-45-6789", PiiClass::Ssn, MaskingStrategy::Hash).expect("hash");
        assert_ne!(a.value, c.value);
    }

    #[test]
    fn pseudonym_carries_claim() {
        let masked = masker()
            .mask("Amar Singh", PiiClass::Name, MaskingStrategy::Pseudonymize)
            .expect("pseudonym");
        let claim = masked.pseudonym.expect("claim");
        assert_eq!(claim.class, PiiClass::Name);
        assert_eq!(claim.round, 0);
        assert!(!masked.value.contains("Amar"));
    }

    #[test]
    fn failures_are_reported() {
        let keyless = Masker::new(&SecurityConfig {
            key: String::new(),
            ..SecurityConfig::default()
        });
        assert_eq!(
            keyless.mask("x", PiiClass::Ssn, MaskingStrategy::Hash),
            Err(MaskError::MissingKey)
        );
        let err = keyless
            .mask("4111", PiiClass::CreditCard, MaskingStrategy::Tokenize)
            .expect_err("no key");
        assert_eq!(
            err,
            MaskError::Token {
                class: PiiClass::CreditCard,
                source: TokenError::MissingKey
            }
        );
        assert!(!err.is_transient());
        assert!(matches!(
            masker().mask("", PiiClass::Email, MaskingStrategy::Partial),
            Err(MaskError::EmptyValue { .. })
        ));
    }
}
