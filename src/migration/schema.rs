//! Typed table-schema descriptions

use crate::migration::columns::ColumnList;
use crate::migration::error::{ConfigurationError, ForeignKeyConfigError};
use std::fmt;
use std::str::FromStr;

/// `ON DELETE` / `ON UPDATE` behaviour of a foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferentialAction {
    #[default]
    Restrict,
    Cascade,
    NoAction,
    SetDefault,
    SetNull,
}

impl ReferentialAction {
    /// SQL keyword(s) for the action
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::SetNull => "SET NULL",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Case-insensitive; `NO ACTION` and `NO_ACTION` are both accepted
impl FromStr for ReferentialAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        match normalized.as_str() {
            "RESTRICT" => Ok(ReferentialAction::Restrict),
            "CASCADE" => Ok(ReferentialAction::Cascade),
            "NO ACTION" => Ok(ReferentialAction::NoAction),
            "SET DEFAULT" => Ok(ReferentialAction::SetDefault),
            "SET NULL" => Ok(ReferentialAction::SetNull),
            _ => Err(s.to_string()),
        }
    }
}

/// A foreign key declared as part of a table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    /// Explicit name used for both the constraint and its supporting index;
    /// `None` means both names are generated
    pub name: Option<String>,
    pub columns: ColumnList,
    pub ref_table: String,
    pub ref_columns: ColumnList,
    /// `None` resolves to RESTRICT
    pub on_delete: Option<ReferentialAction>,
    /// `None` resolves to RESTRICT
    pub on_update: Option<ReferentialAction>,
    /// Whether the supporting index is unique
    pub unique: bool,
}

impl ForeignKeySpec {
    pub fn new(
        columns: impl Into<ColumnList>,
        ref_table: impl Into<String>,
        ref_columns: impl Into<ColumnList>,
    ) -> Self {
        Self {
            name: None,
            columns: columns.into(),
            ref_table: ref_table.into(),
            ref_columns: ref_columns.into(),
            on_delete: None,
            on_update: None,
            unique: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn resolved_on_delete(&self) -> ReferentialAction {
        self.on_delete.unwrap_or_default()
    }

    pub fn resolved_on_update(&self) -> ReferentialAction {
        self.on_update.unwrap_or_default()
    }

    /// Key used in error reports: the explicit name or the position
    pub(crate) fn error_key(&self, position: usize) -> String {
        self.name.clone().unwrap_or_else(|| position.to_string())
    }

    pub(crate) fn config_error(&self, position: usize, error: ForeignKeyConfigError) -> ConfigurationError {
        ConfigurationError::foreign_key(self.error_key(position), error)
    }
}

/// An explicitly declared index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// The field spec as written, e.g. `"customer_name, created_at"`
    pub fields: String,
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(fields: impl Into<String>, unique: bool) -> Self {
        Self {
            fields: fields.into(),
            unique,
        }
    }

    pub fn columns(&self) -> ColumnList {
        ColumnList::parse(&self.fields)
    }
}

/// Full description of a table to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Logical name, not yet wrapped
    pub name: String,
    /// Column name => column type, in declaration order
    pub columns: Vec<(String, String)>,
    pub foreign_keys: Vec<ForeignKeySpec>,
    pub indexes: Vec<IndexSpec>,
    /// Raw options appended to `CREATE TABLE`
    pub options: Option<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            options: None,
        }
    }

    pub fn column(mut self, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), column_type.into()));
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKeySpec) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn index(mut self, fields: impl Into<String>, unique: bool) -> Self {
        self.indexes.push(IndexSpec::new(fields, unique));
        self
    }

    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!("cascade".parse(), Ok(ReferentialAction::Cascade));
        assert_eq!("Set Null".parse(), Ok(ReferentialAction::SetNull));
        assert_eq!("NO_ACTION".parse(), Ok(ReferentialAction::NoAction));
        assert_eq!("set_default".parse(), Ok(ReferentialAction::SetDefault));
        assert!("DELETE".parse::<ReferentialAction>().is_err());
    }

    #[test]
    fn test_foreign_key_defaults() {
        let fk = ForeignKeySpec::new("author_id", "user", "id");
        assert_eq!(fk.resolved_on_delete(), ReferentialAction::Restrict);
        assert_eq!(fk.resolved_on_update(), ReferentialAction::Restrict);
        assert!(!fk.unique);
        assert_eq!(fk.error_key(3), "3");
        assert_eq!(fk.named("fk_author").error_key(3), "fk_author");
    }

    #[test]
    fn test_table_schema_builder_keeps_order() {
        let schema = TableSchema::new("post")
            .column("id", "pk")
            .column("title", "string NOT NULL")
            .index("title", true);
        assert_eq!(schema.columns[0].0, "id");
        assert_eq!(schema.columns[1].0, "title");
        assert_eq!(schema.indexes[0].columns(), ColumnList::from("title"));
    }
}
