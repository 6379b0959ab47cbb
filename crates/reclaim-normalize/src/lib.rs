//! Field normalizers.
//!
//! One pure function per semantic type, dispatched by the field's declared
//! type through [`Normalizer::normalize`]. A normalizer never fails: every
//! problem is returned as a [`FieldIssue`](reclaim_model::FieldIssue) next to
//! the (possibly absent) normalized value.
//!
//! Absent or blank input is not an issue here. The field default from the
//! schema rule is substituted when one exists; currency falls back to zero
//! minor units; every other type yields no value. Whether a missing value is
//! a problem is the record validator's decision.

pub mod boolean;
pub mod contact;
pub mod currency;
pub mod date;
pub mod identifier;
pub mod text;

mod normalized;
mod normalizer;

pub use boolean::{FALSE_TOKENS, TRUE_TOKENS, normalize_boolean};
pub use contact::{normalize_email, normalize_phone};
pub use currency::{normalize_currency, parse_minor_units};
pub use date::{DateMatcher, DatePattern};
pub use identifier::{normalize_integer_id, normalize_pattern_code};
pub use normalized::Normalized;
pub use normalizer::Normalizer;
pub use text::normalize_text;
