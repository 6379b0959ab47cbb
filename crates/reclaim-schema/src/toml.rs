//! TOML schema sources: an array of `[[fields]]` tables.
//!
//! ```toml
//! [[fields]]
//! name = "record_id"
//! source = "rec_id"
//! type = "integer_id"
//! required = true
//! ```

use serde::Deserialize;

use crate::error::SchemaError;
use crate::registry::{FieldEntry, RequiredFlag};

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    fields: Vec<FieldTable>,
}

#[derive(Debug, Deserialize)]
struct FieldTable {
    name: Option<String>,
    #[serde(alias = "legacy_field")]
    source: Option<String>,
    #[serde(rename = "type", alias = "data_type")]
    semantic_type: Option<String>,
    required: Option<bool>,
    #[serde(alias = "validation")]
    rule: Option<String>,
    description: Option<String>,
    example: Option<String>,
}

pub(crate) fn read_entries(content: &str) -> Result<Vec<FieldEntry>, SchemaError> {
    let document: SchemaDocument =
        ::toml::from_str(content).map_err(|source| SchemaError::Toml { source })?;
    Ok(document
        .fields
        .into_iter()
        .map(|table| FieldEntry {
            name: table.name,
            source: table.source,
            semantic_type: table.semantic_type,
            required: table.required.map(RequiredFlag::Bool),
            rule: table.rule,
            description: table.description,
            example: table.example,
        })
        .collect())
}
