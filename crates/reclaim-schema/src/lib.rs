#![deny(unsafe_code)]

pub mod csv;
pub mod error;
pub mod fingerprint;
pub mod registry;
pub mod rule;
pub mod toml;

pub use crate::error::{SchemaError, UnknownFieldError};
pub use crate::registry::{FieldMapping, SchemaFormat, SchemaRegistry, SchemaSource};
pub use crate::rule::parse_rule;
