//! PII classification and masking.
//!
//! Classification is a static policy over the field definition and never
//! looks at record content. Masking is keyed: hashes, tokens and pseudonyms
//! are deterministic for a given key and input, and never reversible from
//! the output alone.

pub mod classify;
pub mod error;
pub mod mask;
pub mod plan;
pub mod pseudonym;
pub mod token;

mod digest;

pub use classify::classify;
pub use error::{MaskError, TokenError};
pub use mask::{Masked, Masker};
pub use plan::{ProtectedField, ProtectionPlan};
pub use pseudonym::PseudonymLedger;
pub use token::{KeyedTokenStore, TokenStore};
