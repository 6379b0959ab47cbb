//! CSV schema sources.
//!
//! One row per field. Column headers are matched case-sensitively after
//! trimming; the legacy `field_name` / `data_type` / `validation` spellings
//! are accepted as aliases.

use std::io::Cursor;

use serde::Deserialize;

use crate::error::SchemaError;
use crate::registry::{FieldEntry, RequiredFlag};

#[derive(Debug, Deserialize)]
struct FieldCsvRow {
    #[serde(default, alias = "field_name", alias = "target_field")]
    name: String,
    #[serde(default, alias = "legacy_field")]
    source: String,
    #[serde(default, rename = "type", alias = "data_type")]
    semantic_type: String,
    #[serde(default)]
    required: String,
    #[serde(default, alias = "validation", alias = "validation_rule")]
    rule: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    example: String,
}

pub(crate) fn read_entries(content: &str) -> Result<Vec<FieldEntry>, SchemaError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::All)
        .from_reader(Cursor::new(content.as_bytes()));

    let mut entries = Vec::new();
    for result in reader.deserialize::<FieldCsvRow>() {
        let row = result.map_err(|e| SchemaError::Csv {
            message: e.to_string(),
        })?;
        if row.name.is_empty() && row.semantic_type.is_empty() && row.rule.is_empty() {
            continue;
        }
        entries.push(FieldEntry {
            name: non_empty(&row.name),
            source: non_empty(&row.source),
            semantic_type: non_empty(&row.semantic_type),
            required: non_empty(&row.required).map(RequiredFlag::Text),
            rule: non_empty(&row.rule),
            description: non_empty(&row.description),
            example: non_empty(&row.example),
        });
    }
    Ok(entries)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_headers() {
        let entries = read_entries(
            "field_name,legacy_field,data_type,required,validation,description\n\
             record_id,rec_id,int,true,,Record identifier\n\
             ,,,,,\n\
             unit_number,unit,str,yes,upper;alnum,Unit\n",
        )
        .expect("read csv");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name.as_deref(), Some("record_id"));
        assert_eq!(entries[0].source.as_deref(), Some("rec_id"));
        assert_eq!(entries[0].rule, None);
        assert_eq!(entries[1].rule.as_deref(), Some("upper;alnum"));
    }

    #[test]
    fn ragged_rows_fail() {
        let err = read_entries("name,type\nrecord_id,int,extra\n").expect_err("ragged row");
        assert!(matches!(err, SchemaError::Csv { .. }));
    }
}
