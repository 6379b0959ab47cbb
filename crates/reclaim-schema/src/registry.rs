//! The schema registry: ordered, immutable field definitions.

use std::collections::HashMap;
use std::path::Path;

use reclaim_model::{FieldSpec, SemanticType};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{SchemaError, UnknownFieldError};
use crate::fingerprint::fingerprint;
use crate::rule::parse_rule;

/// Declarative formats a schema can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Csv,
    Toml,
}

impl SchemaFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Schema text together with its format.
#[derive(Debug, Clone, Copy)]
pub struct SchemaSource<'a> {
    pub format: SchemaFormat,
    pub text: &'a str,
}

impl<'a> SchemaSource<'a> {
    pub fn csv(text: &'a str) -> Self {
        Self {
            format: SchemaFormat::Csv,
            text,
        }
    }

    pub fn toml(text: &'a str) -> Self {
        Self {
            format: SchemaFormat::Toml,
            text,
        }
    }
}

/// Required flag as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequiredFlag {
    Bool(bool),
    Text(String),
}

/// Format-independent field entry, validated into a [`FieldSpec`].
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldEntry {
    pub name: Option<String>,
    pub source: Option<String>,
    pub semantic_type: Option<String>,
    pub required: Option<RequiredFlag>,
    pub rule: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
}

/// Legacy-to-target mapping row for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub legacy_field: String,
    pub target_field: String,
    pub semantic_type: SemanticType,
    pub required: bool,
    pub transformation: &'static str,
    pub example: Option<String>,
}

/// Field definitions in schema order. No mutation after load.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    fingerprint: String,
}

impl SchemaRegistry {
    /// Parse and validate a schema source.
    pub fn load(source: SchemaSource<'_>) -> Result<Self, SchemaError> {
        let entries = match source.format {
            SchemaFormat::Csv => crate::csv::read_entries(source.text)?,
            SchemaFormat::Toml => crate::toml::read_entries(source.text)?,
        };
        let fields = entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| build_spec(position + 1, entry))
            .collect::<Result<Vec<_>, _>>()?;
        let registry = Self::assemble(fields, fingerprint(source.text))?;
        info!(
            fields = registry.fields.len(),
            fingerprint = %registry.fingerprint,
            format = ?source.format,
            "schema loaded"
        );
        Ok(registry)
    }

    /// Read a schema file, choosing the format by extension.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let format = SchemaFormat::from_path(path).ok_or_else(|| SchemaError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        debug!(path = %path.display(), "reading schema");
        Self::load(SchemaSource { format, text: &text })
    }

    /// Build a registry from field specs constructed in code.
    pub fn from_fields(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let canonical: String = fields
            .iter()
            .map(|f| {
                format!(
                    "{}|{}|{}|{}|{}\n",
                    f.name,
                    f.source_column(),
                    f.semantic_type,
                    f.required,
                    f.rule_expr
                )
            })
            .collect();
        Self::assemble(fields, fingerprint(&canonical))
    }

    fn assemble(fields: Vec<FieldSpec>, fingerprint: String) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            fields,
            index,
            fingerprint,
        })
    }

    pub fn lookup(&self, name: &str) -> Result<&FieldSpec, UnknownFieldError> {
        self.index
            .get(name)
            .map(|&position| &self.fields[position])
            .ok_or_else(|| UnknownFieldError {
                name: name.to_string(),
            })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// SHA-256 hex of the schema source.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// First integer-id field; its raw value keys records in reports.
    pub fn identity_field(&self) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.semantic_type == SemanticType::IntegerId)
    }

    pub fn field_mappings(&self) -> Vec<FieldMapping> {
        self.fields
            .iter()
            .map(|f| FieldMapping {
                legacy_field: f.source_column().to_string(),
                target_field: f.name.clone(),
                semantic_type: f.semantic_type,
                required: f.required,
                transformation: f.semantic_type.transformation(),
                example: f.example.clone(),
            })
            .collect()
    }
}

fn build_spec(position: usize, entry: FieldEntry) -> Result<FieldSpec, SchemaError> {
    let name = entry
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(SchemaError::MissingName { position })?;
    let type_text = entry
        .semantic_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| SchemaError::MissingType { field: name.clone() })?;
    let semantic_type =
        type_text
            .parse::<SemanticType>()
            .map_err(|_| SchemaError::UnknownType {
                field: name.clone(),
                value: type_text.clone(),
            })?;
    let required = match entry.required {
        None => false,
        Some(RequiredFlag::Bool(flag)) => flag,
        Some(RequiredFlag::Text(text)) => parse_required(&name, &text)?,
    };
    let rule_expr = entry.rule.unwrap_or_default();
    let rule = parse_rule(&name, semantic_type, &rule_expr)?;

    Ok(FieldSpec {
        source: entry.source.filter(|s| !s.is_empty() && *s != name),
        semantic_type,
        required,
        rule,
        rule_expr,
        description: entry.description.unwrap_or_default(),
        example: entry.example,
        name,
    })
}

fn parse_required(field: &str, text: &str) -> Result<bool, SchemaError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" | "optional" => Ok(false),
        "true" | "yes" | "y" | "1" | "required" => Ok(true),
        _ => Err(SchemaError::InvalidRequired {
            field: field.to_string(),
            value: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "name,source,type,required,rule,description,example\n\
        record_id,rec_id,int,true,,Record identifier,1003\n\
        client_name,,str,true,\"trim_trailing=,\",Client name,\"Singh, Amar\"\n\
        unit_number,unit,str,true,upper;alnum,Unit number,4B\n";

    #[test]
    fn lookup_by_name() {
        let registry = SchemaRegistry::load(SchemaSource::csv(SCHEMA)).expect("load schema");
        assert_eq!(registry.len(), 3);
        let unit = registry.lookup("unit_number").expect("unit field");
        assert_eq!(unit.source_column(), "unit");
        assert!(unit.rule.alnum_only);
        assert_eq!(
            registry.lookup("balance"),
            Err(UnknownFieldError {
                name: "balance".to_string()
            })
        );
        assert_eq!(
            registry.identity_field().map(|f| f.name.as_str()),
            Some("record_id")
        );
    }

    #[test]
    fn keeps_schema_order_in_mappings() {
        let registry = SchemaRegistry::load(SchemaSource::csv(SCHEMA)).expect("load schema");
        let mappings = registry.field_mappings();
        let targets: Vec<_> = mappings.iter().map(|m| m.target_field.as_str()).collect();
        assert_eq!(targets, ["record_id", "client_name", "unit_number"]);
        assert_eq!(mappings[0].legacy_field, "rec_id");
        assert_eq!(mappings[1].legacy_field, "client_name");
        assert_eq!(mappings[0].example.as_deref(), Some("1003"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = SchemaRegistry::load(SchemaSource::csv(
            "name,type\nrecord_id,int\nrecord_id,str\n",
        ))
        .expect_err("duplicate");
        assert!(matches!(err, SchemaError::DuplicateField { field } if field == "record_id"));
    }

    #[test]
    fn rejects_missing_and_unknown_types() {
        assert!(matches!(
            SchemaRegistry::load(SchemaSource::csv("name,type\nrecord_id,\n")),
            Err(SchemaError::MissingType { .. })
        ));
        assert!(matches!(
            SchemaRegistry::load(SchemaSource::csv("name,type\nrecord_id,uuid\n")),
            Err(SchemaError::UnknownType { .. })
        ));
        assert!(matches!(
            SchemaRegistry::load(SchemaSource::csv("name,type,required\nrecord_id,int,maybe\n")),
            Err(SchemaError::InvalidRequired { .. })
        ));
        assert!(matches!(
            SchemaRegistry::load(SchemaSource::csv("name,type\n")),
            Err(SchemaError::Empty)
        ));
    }

    #[test]
    fn fingerprint_tracks_source() {
        let a = SchemaRegistry::load(SchemaSource::csv(SCHEMA)).expect("load");
        let b = SchemaRegistry::load(SchemaSource::csv(SCHEMA)).expect("load");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), fingerprint(SCHEMA));
    }

    #[test]
    fn from_fields_checks_duplicates() {
        let fields = vec![
            FieldSpec::new("a", SemanticType::String),
            FieldSpec::new("a", SemanticType::Date),
        ];
        assert!(SchemaRegistry::from_fields(fields).is_err());
    }
}
