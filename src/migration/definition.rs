//! Declarative table definitions (JSON / TOML)
//!
//! A definition document looks like:
//!
//! ```toml
//! name = "post"
//!
//! [columns]
//! id = "pk"
//! title = "string NOT NULL"
//! author_id = "integer NOT NULL"
//!
//! [[foreignKeys]]
//! columns = "author_id"
//! refTable = "user"
//! refColumns = "id"
//! onDelete = "cascade"
//!
//! [indexes]
//! "title, author_id" = true
//! ```
//!
//! `foreignKeys` may also be a table keyed by constraint name. Every shape
//! check happens here, while converting to a [`TableSchema`], so the typed
//! result only has to pass the typed validator afterwards.

use crate::migration::columns::ColumnList;
use crate::migration::error::{
    ColumnConfigError, ConfigurationError, ForeignKeyConfigError, IndexConfigError,
};
use crate::migration::schema::{ForeignKeySpec, IndexSpec, ReferentialAction, TableSchema};
use crate::migration::validate::{
    is_numeric_key, validate_foreign_key_name, validate_index_fields, validate_table_schema,
};
use serde_json::{Map, Value};
use std::path::Path;

pub const CFG_COLUMNS: &str = "columns";
pub const CFG_REF_TABLE: &str = "refTable";
pub const CFG_REF_COLUMNS: &str = "refColumns";
pub const CFG_ON_DELETE: &str = "onDelete";
pub const CFG_ON_UPDATE: &str = "onUpdate";
pub const CFG_UNIQUE: &str = "unique";

const FOREIGN_KEY_KEYS: [&str; 6] = [
    CFG_COLUMNS,
    CFG_REF_TABLE,
    CFG_REF_COLUMNS,
    CFG_ON_DELETE,
    CFG_ON_UPDATE,
    CFG_UNIQUE,
];

const TABLE_KEYS: [&str; 5] = ["name", "columns", "foreignKeys", "indexes", "options"];

impl TableSchema {
    /// Build and validate a schema from a JSON-like value
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        let Value::Object(table) = value else {
            return Err(ConfigurationError::Parse(
                "table definition must be a map".to_string(),
            ));
        };
        if let Some(key) = table.keys().find(|key| !TABLE_KEYS.contains(&key.as_str())) {
            return Err(ConfigurationError::Parse(format!(
                "unknown table definition key: {key}"
            )));
        }

        let name = match table.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            _ => return Err(ConfigurationError::EmptyTableName),
        };
        let options = match table.get("options") {
            None | Some(Value::Null) => None,
            Some(Value::String(options)) => Some(options.clone()),
            Some(other) => {
                return Err(ConfigurationError::Parse(format!(
                    "table options must be a string, got {other}"
                )))
            }
        };

        let schema = TableSchema {
            name,
            columns: parse_columns(table.get("columns"))?,
            foreign_keys: parse_foreign_keys(table.get("foreignKeys"))?,
            indexes: parse_indexes(table.get("indexes"))?,
            options,
        };
        validate_table_schema(&schema)?;
        Ok(schema)
    }

    /// Build and validate a schema from a TOML document
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            toml::from_str(document).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Build and validate a schema from a JSON document
    pub fn from_json_str(document: &str) -> Result<Self, ConfigurationError> {
        let value: Value =
            serde_json::from_str(document).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Load a definition file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::Parse(format!(
                "failed to read table definition {}: {}",
                path.display(),
                e
            ))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&document),
            _ => Self::from_toml_str(&document),
        }
    }
}

fn parse_columns(value: Option<&Value>) -> Result<Vec<(String, String)>, ConfigurationError> {
    let columns = match value {
        None | Some(Value::Null) => return Err(ColumnConfigError::Empty.into()),
        Some(Value::Object(columns)) => columns,
        Some(_) => return Err(ColumnConfigError::Positional.into()),
    };
    if columns.is_empty() {
        return Err(ColumnConfigError::Empty.into());
    }

    let mut parsed = Vec::with_capacity(columns.len());
    for (name, column_type) in columns {
        if name.trim().is_empty() {
            return Err(ColumnConfigError::EmptyName.into());
        }
        if is_numeric_key(name) {
            return Err(ColumnConfigError::NumericName(name.clone()).into());
        }
        match column_type {
            Value::String(column_type) if !column_type.trim().is_empty() => {
                parsed.push((name.clone(), column_type.clone()));
            }
            _ => return Err(ColumnConfigError::InvalidType(name.clone()).into()),
        }
    }
    Ok(parsed)
}

fn parse_foreign_keys(value: Option<&Value>) -> Result<Vec<ForeignKeySpec>, ConfigurationError> {
    let entries: Vec<(String, Option<String>, &Value)> = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position.to_string(), None, entry))
            .collect(),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(key, entry)| {
                let name = (!is_numeric_key(key)).then(|| key.clone());
                (key.clone(), name, entry)
            })
            .collect(),
        Some(other) => {
            return Err(ConfigurationError::Parse(format!(
                "foreign keys must be a list or a map, got {other}"
            )))
        }
    };

    entries
        .into_iter()
        .map(|(key, name, entry)| {
            parse_foreign_key(name, entry).map_err(|error| ConfigurationError::foreign_key(key, error))
        })
        .collect()
}

fn parse_foreign_key(name: Option<String>, entry: &Value) -> Result<ForeignKeySpec, ForeignKeyConfigError> {
    validate_foreign_key_name(name.as_deref())?;

    let Value::Object(fk) = entry else {
        return Err(ForeignKeyConfigError::NotAMap);
    };
    for field in [CFG_COLUMNS, CFG_REF_TABLE, CFG_REF_COLUMNS] {
        if matches!(fk.get(field), None | Some(Value::Null)) {
            return Err(ForeignKeyConfigError::MissingField(field));
        }
    }

    let on_delete = parse_action(fk, CFG_ON_DELETE)?;
    let on_update = parse_action(fk, CFG_ON_UPDATE)?;
    let unique = match fk.get(CFG_UNIQUE) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(unique)) => *unique,
        Some(_) => return Err(ForeignKeyConfigError::InvalidUnique),
    };
    if let Some(key) = fk.keys().find(|key| !FOREIGN_KEY_KEYS.contains(&key.as_str())) {
        return Err(ForeignKeyConfigError::UnknownKey(key.clone()));
    }

    let ref_table = match fk.get(CFG_REF_TABLE) {
        Some(Value::String(table)) => table.clone(),
        _ => return Err(ForeignKeyConfigError::InvalidField(CFG_REF_TABLE)),
    };

    Ok(ForeignKeySpec {
        name,
        columns: parse_column_list(fk, CFG_COLUMNS)?,
        ref_table,
        ref_columns: parse_column_list(fk, CFG_REF_COLUMNS)?,
        on_delete,
        on_update,
        unique,
    })
}

fn parse_action(
    fk: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<ReferentialAction>, ForeignKeyConfigError> {
    match fk.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(action)) => action
            .parse()
            .map(Some)
            .map_err(|value| ForeignKeyConfigError::InvalidAction { field, value }),
        Some(other) => Err(ForeignKeyConfigError::InvalidAction {
            field,
            value: other.to_string(),
        }),
    }
}

fn parse_column_list(
    fk: &Map<String, Value>,
    field: &'static str,
) -> Result<ColumnList, ForeignKeyConfigError> {
    match fk.get(field) {
        Some(Value::String(columns)) => Ok(ColumnList::parse(columns)),
        Some(Value::Array(columns)) => columns
            .iter()
            .map(|column| column.as_str().ok_or(ForeignKeyConfigError::InvalidField(field)))
            .collect::<Result<Vec<_>, _>>()
            .map(ColumnList::from),
        _ => Err(ForeignKeyConfigError::InvalidField(field)),
    }
}

fn parse_indexes(value: Option<&Value>) -> Result<Vec<IndexSpec>, ConfigurationError> {
    let indexes = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(indexes)) => indexes,
        Some(_) => return Err(IndexConfigError::Positional.into()),
    };

    let mut parsed = Vec::with_capacity(indexes.len());
    for (fields, unique) in indexes {
        validate_index_fields(fields)?;
        let Value::Bool(unique) = unique else {
            return Err(IndexConfigError::InvalidUnique(fields.clone()).into());
        };
        parsed.push(IndexSpec::new(fields.clone(), *unique));
    }
    Ok(parsed)
}
