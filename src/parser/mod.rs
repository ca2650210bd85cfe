pub mod attributes;

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::util::{Result, SchemaError};

/// The schema document, split into tables and enums but otherwise untouched.
/// `raw` keeps the verbatim input; it is what gets persisted alongside the
/// migration it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub tables: BTreeMap<String, BTreeMap<String, String>>,
    pub enums: BTreeMap<String, Vec<String>>,
    pub raw: String,
}

/// Parses a schema document. The top level is a mapping; each entry is
/// discriminated by value shape: a sequence of strings declares an enum, a
/// mapping of column-name to attribute-string declares a table. The sectioned
/// layout (`tables:` / `enums:` keys grouping the same shapes one level down)
/// is accepted as well.
pub fn parse_document(input: &str) -> Result<RawConfig> {
    let doc: Value =
        serde_yaml::from_str(input).map_err(|e| SchemaError::ConfigParse(e.to_string()))?;

    let mut config = RawConfig {
        raw: input.to_string(),
        ..Default::default()
    };

    let entries = match doc {
        Value::Mapping(entries) => entries,
        Value::Null => return Ok(config),
        other => {
            return Err(SchemaError::ConfigParse(format!(
                "document root must be a mapping, found {}",
                shape_name(&other)
            )))
        }
    };

    for (key, value) in entries {
        let key = string_key(&key)?;

        match value {
            Value::Sequence(items) => {
                config.enums.insert(key.clone(), enum_values(&key, items)?);
            }
            Value::Mapping(fields) if key == "tables" && all_mappings(&fields) => {
                for (name, columns) in fields {
                    let name = string_key(&name)?;
                    if let Value::Mapping(columns) = columns {
                        config.tables.insert(name.clone(), table_columns(&name, columns)?);
                    }
                }
            }
            Value::Mapping(fields) if key == "enums" && all_sequences(&fields) => {
                for (name, values) in fields {
                    let name = string_key(&name)?;
                    if let Value::Sequence(values) = values {
                        config.enums.insert(name.clone(), enum_values(&name, values)?);
                    }
                }
            }
            Value::Mapping(fields) => {
                config.tables.insert(key.clone(), table_columns(&key, fields)?);
            }
            other => {
                return Err(SchemaError::ConfigShape {
                    key,
                    observed: shape_name(&other).to_string(),
                })
            }
        }
    }

    Ok(config)
}

fn table_columns(
    table: &str,
    fields: serde_yaml::Mapping,
) -> Result<BTreeMap<String, String>> {
    let mut columns = BTreeMap::new();
    for (name, value) in fields {
        let name = string_key(&name)?;
        match value {
            Value::String(attrs) => {
                columns.insert(name, attrs);
            }
            other => {
                return Err(SchemaError::ConfigShape {
                    key: format!("{table}.{name}"),
                    observed: shape_name(&other).to_string(),
                })
            }
        }
    }
    Ok(columns)
}

fn enum_values(name: &str, items: Vec<Value>) -> Result<Vec<String>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(v) => Ok(v),
            other => Err(SchemaError::ConfigShape {
                key: name.to_string(),
                observed: format!("sequence of {}", shape_name(&other)),
            }),
        })
        .collect()
}

fn all_mappings(fields: &serde_yaml::Mapping) -> bool {
    fields.values().all(|v| matches!(v, Value::Mapping(_)))
}

fn all_sequences(fields: &serde_yaml::Mapping) -> bool {
    fields.values().all(|v| matches!(v, Value::Sequence(_)))
}

fn string_key(key: &Value) -> Result<String> {
    match key {
        Value::String(k) => Ok(k.clone()),
        other => Err(SchemaError::ConfigParse(format!(
            "mapping keys must be strings, found {}",
            shape_name(other)
        ))),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
