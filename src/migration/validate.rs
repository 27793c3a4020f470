//! Validation of typed table schemas
//!
//! Sections are checked in a fixed order (columns, foreign keys, indexes) and
//! the first violation is returned. Validation never touches the database.

use crate::migration::columns::ColumnList;
use crate::migration::error::{
    ColumnConfigError, ConfigurationError, ForeignKeyConfigError, IndexConfigError,
};
use crate::migration::naming::MAX_NAME_LENGTH;
use crate::migration::schema::{ForeignKeySpec, IndexSpec, TableSchema};
use std::collections::HashSet;

/// Validate a whole table schema
pub fn validate_table_schema(schema: &TableSchema) -> Result<(), ConfigurationError> {
    if schema.name.trim().is_empty() {
        return Err(ConfigurationError::EmptyTableName);
    }
    validate_columns(&schema.columns)?;
    validate_foreign_keys(&schema.foreign_keys)?;
    validate_indexes(&schema.indexes)?;
    Ok(())
}

/// A key made only of digits is what a positional entry looks like
pub(crate) fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_columns(columns: &[(String, String)]) -> Result<(), ConfigurationError> {
    if columns.is_empty() {
        return Err(ColumnConfigError::Empty.into());
    }
    let mut seen = HashSet::new();
    for (name, column_type) in columns {
        if name.trim().is_empty() {
            return Err(ColumnConfigError::EmptyName.into());
        }
        if is_numeric_key(name) {
            return Err(ColumnConfigError::NumericName(name.clone()).into());
        }
        if column_type.trim().is_empty() {
            return Err(ColumnConfigError::InvalidType(name.clone()).into());
        }
        if !seen.insert(name.as_str()) {
            return Err(ColumnConfigError::Duplicate(name.clone()).into());
        }
    }
    Ok(())
}

pub fn validate_foreign_keys(foreign_keys: &[ForeignKeySpec]) -> Result<(), ConfigurationError> {
    let mut names = HashSet::new();
    for (position, fk) in foreign_keys.iter().enumerate() {
        validate_foreign_key_name(fk.name.as_deref())
            .map_err(|error| fk.config_error(position, error))?;
        if let Some(name) = fk.name.as_deref() {
            if !names.insert(name) {
                return Err(fk.config_error(position, ForeignKeyConfigError::DuplicateName));
            }
        }

        let missing = if fk.columns.is_empty() {
            Some("columns")
        } else if fk.ref_table.trim().is_empty() {
            Some("refTable")
        } else if fk.ref_columns.is_empty() {
            Some("refColumns")
        } else {
            None
        };
        if let Some(field) = missing {
            return Err(fk.config_error(position, ForeignKeyConfigError::MissingField(field)));
        }
    }
    Ok(())
}

pub(crate) fn validate_foreign_key_name(name: Option<&str>) -> Result<(), ForeignKeyConfigError> {
    match name {
        Some(name) if name.len() > MAX_NAME_LENGTH => Err(ForeignKeyConfigError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_NAME_LENGTH,
        }),
        _ => Ok(()),
    }
}

pub fn validate_indexes(indexes: &[IndexSpec]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for index in indexes {
        validate_index_fields(&index.fields)?;
        // "a, b" and "a b" describe the same index
        if !seen.insert(index.columns().joined()) {
            return Err(IndexConfigError::Duplicate(index.fields.clone()).into());
        }
    }
    Ok(())
}

pub(crate) fn validate_index_fields(fields: &str) -> Result<(), IndexConfigError> {
    if is_numeric_key(fields.trim()) || ColumnList::parse(fields).is_empty() {
        return Err(IndexConfigError::InvalidFields(fields.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> TableSchema {
        TableSchema::new("post")
            .column("id", "pk")
            .column("title", "string NOT NULL")
    }

    #[test]
    fn test_valid_schema_passes() {
        let schema = post()
            .foreign_key(ForeignKeySpec::new("author_id", "user", "id"))
            .index("title", false);
        assert_eq!(validate_table_schema(&schema), Ok(()));
    }

    #[test]
    fn test_empty_table_name() {
        let schema = TableSchema::new("  ").column("id", "pk");
        assert_eq!(validate_table_schema(&schema), Err(ConfigurationError::EmptyTableName));
    }

    #[test]
    fn test_no_columns() {
        let schema = TableSchema::new("post");
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Columns(ColumnConfigError::Empty))
        );
    }

    #[test]
    fn test_numeric_column_name() {
        let schema = TableSchema::new("post").column("0", "pk");
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Columns(ColumnConfigError::NumericName("0".into())))
        );
    }

    #[test]
    fn test_column_error_reported_before_foreign_key_error() {
        let schema = TableSchema::new("post")
            .column("1", "pk")
            .foreign_key(ForeignKeySpec::new("", "user", "id"));
        assert!(matches!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Columns(_))
        ));
    }

    #[test]
    fn test_foreign_key_name_too_long() {
        let name = "f".repeat(MAX_NAME_LENGTH + 1);
        let schema = post().foreign_key(ForeignKeySpec::new("author_id", "user", "id").named(name.clone()));
        match validate_table_schema(&schema) {
            Err(ConfigurationError::ForeignKey { key, error }) => {
                assert_eq!(key, name);
                assert!(matches!(error, ForeignKeyConfigError::NameTooLong { len: 65, max: 64, .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_key_name_at_limit_is_fine() {
        let name = "f".repeat(MAX_NAME_LENGTH);
        let schema = post().foreign_key(ForeignKeySpec::new("author_id", "user", "id").named(name));
        assert_eq!(validate_table_schema(&schema), Ok(()));
    }

    #[test]
    fn test_foreign_key_missing_ref_table() {
        let schema = post().foreign_key(ForeignKeySpec::new("author_id", "", "id"));
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::foreign_key(
                "0",
                ForeignKeyConfigError::MissingField("refTable")
            ))
        );
    }

    #[test]
    fn test_foreign_key_error_before_index_error() {
        let schema = post()
            .foreign_key(ForeignKeySpec::new("author_id", "user", ""))
            .index("", false);
        assert!(matches!(
            validate_table_schema(&schema),
            Err(ConfigurationError::ForeignKey { .. })
        ));
    }

    #[test]
    fn test_duplicate_column() {
        let schema = post().column("id", "string");
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Columns(ColumnConfigError::Duplicate("id".into())))
        );
    }

    #[test]
    fn test_duplicate_index_fields() {
        let schema = post().index("id", false).index("id", false);
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Indexes(IndexConfigError::Duplicate("id".into())))
        );

        let schema = post().index("id, title", true).index("id title", false);
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Indexes(IndexConfigError::Duplicate("id title".into())))
        );
    }

    #[test]
    fn test_duplicate_foreign_key_name() {
        let schema = post()
            .foreign_key(ForeignKeySpec::new("author_id", "user", "id").named("fk_x"))
            .foreign_key(ForeignKeySpec::new("editor_id", "user", "id").named("fk_x"));
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::foreign_key("fk_x", ForeignKeyConfigError::DuplicateName))
        );
    }

    #[test]
    fn test_anonymous_foreign_keys_may_repeat() {
        let schema = post()
            .foreign_key(ForeignKeySpec::new("author_id", "user", "id"))
            .foreign_key(ForeignKeySpec::new("author_id", "member", "id"));
        assert_eq!(validate_table_schema(&schema), Ok(()));
    }

    #[test]
    fn test_invalid_index_fields() {
        let schema = post().index("12", true);
        assert_eq!(
            validate_table_schema(&schema),
            Err(ConfigurationError::Indexes(IndexConfigError::InvalidFields("12".into())))
        );
    }
}
