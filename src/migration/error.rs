//! Migration-specific error types

use thiserror::Error;

/// Errors in the `columns` section of a table definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnConfigError {
    /// The table has no columns at all
    #[error("table must define at least one column")]
    Empty,
    /// Columns were given as a list instead of a name => type map
    #[error("table columns must be in a column name => column type format, not positional")]
    Positional,
    /// A column name is empty
    #[error("column name must not be empty")]
    EmptyName,
    /// A column name is a bare number (a positional key)
    #[error("column name '{0}' is numeric; columns must be in a column name => column type format")]
    NumericName(String),
    /// A column type is missing or not a string
    #[error("column '{0}' must have a non-empty string type")]
    InvalidType(String),
    /// The same column name appears twice
    #[error("duplicate column '{0}'")]
    Duplicate(String),
}

/// Errors in a single foreign-key entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForeignKeyConfigError {
    /// The entry is not a key => value map
    #[error("each foreign key must be a map that contains columns, refTable & refColumns items")]
    NotAMap,
    /// One of `columns`, `refTable`, `refColumns` is missing or null
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    /// A required field has the wrong shape
    #[error("field '{0}' must be a column name or a list of column names")]
    InvalidField(&'static str),
    /// The explicit name does not fit into an identifier
    #[error("name too long: '{name}' is {len} characters, the maximum is {max}")]
    NameTooLong { name: String, len: usize, max: usize },
    /// `onDelete` / `onUpdate` is not a recognized action
    #[error("invalid action for {field}: {value}")]
    InvalidAction { field: &'static str, value: String },
    /// `unique` is present but not a boolean
    #[error("'unique' must be a boolean")]
    InvalidUnique,
    /// The entry contains a key this crate does not understand
    #[error("unknown key: {0}")]
    UnknownKey(String),
    /// Another foreign key already uses this explicit name
    #[error("duplicate foreign key name")]
    DuplicateName,
}

/// Errors in the `indexes` section of a table definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexConfigError {
    /// Indexes were given as a list instead of a field spec => unique map
    #[error("indexes must be in a field names => is unique format, not positional")]
    Positional,
    /// A field spec is empty or numeric
    #[error("incorrect field names '{0}' in indexes config")]
    InvalidFields(String),
    /// An `is unique` value is not a boolean
    #[error("incorrect is unique value for index '{0}'")]
    InvalidUnique(String),
    /// Two indexes are declared over the same fields
    #[error("duplicate index on fields '{0}'")]
    Duplicate(String),
}

/// A malformed table-schema description
///
/// Raised before any operation reaches the database, so nothing is ever
/// partially applied because of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("table name must not be empty")]
    EmptyTableName,
    #[error("invalid columns config: {0}")]
    Columns(#[from] ColumnConfigError),
    #[error("invalid foreign key '{key}': {error}")]
    ForeignKey {
        /// Explicit name of the entry, or its position for anonymous entries
        key: String,
        error: ForeignKeyConfigError,
    },
    #[error("invalid indexes config: {0}")]
    Indexes(#[from] IndexConfigError),
    /// The definition document itself could not be read or parsed
    #[error("could not parse table definition: {0}")]
    Parse(String),
}

impl ConfigurationError {
    pub(crate) fn foreign_key(key: impl Into<String>, error: ForeignKeyConfigError) -> Self {
        ConfigurationError::ForeignKey {
            key: key.into(),
            error,
        }
    }
}

/// Errors raised by the database collaborator while executing an operation
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The statement was rejected by the database
    #[error("query error: {0}")]
    Query(String),
    /// Error reported by the underlying driver
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The collaborator cannot express this operation
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },
}

/// Errors from the [`type_enum`](crate::migration::SchemaManager::type_enum) column helper
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnTypeError {
    #[error("cannot create not null column with default null value")]
    NotNullWithoutDefault,
    #[error("default value '{0}' was not found in values list")]
    DefaultNotInValues(String),
    #[error("enum column needs at least one value")]
    NoValues,
}

/// Everything `up()` / `down()` can fail with
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    ColumnType(#[from] ColumnTypeError),
    /// The migration has no `down()` implementation
    #[error("migration '{0}' cannot be reverted")]
    Irreversible(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_error_reports_entry_key() {
        let err = ConfigurationError::foreign_key("0", ForeignKeyConfigError::UnknownKey("refTbl".into()));
        assert_eq!(err.to_string(), "invalid foreign key '0': unknown key: refTbl");
    }

    #[test]
    fn test_configuration_error_converts_into_migration_error() {
        let err: MigrationError = ConfigurationError::from(ColumnConfigError::Empty).into();
        assert!(matches!(
            err,
            MigrationError::Configuration(ConfigurationError::Columns(ColumnConfigError::Empty))
        ));
    }
}
