//! SchemaManager - schema operations available to migrations

use crate::backend::SchemaBackend;
use crate::config::MigrationConfig;
use crate::migration::column_type;
use crate::migration::columns::ColumnList;
use crate::migration::error::{ColumnTypeError, ExecutionError};
use crate::migration::naming::{self, PREFIX_FOREIGN_KEY_INDEX};
use crate::migration::operation::SchemaOperation;
use crate::migration::schema::ReferentialAction;
use crate::migration::table_name;

/// Issues schema operations to a [`SchemaBackend`]
///
/// Every table name passed in (referenced tables included) goes through
/// `{{%name}}` wrapping when `auto_wrap_table_names` is on. Generated names
/// are derived from the backend's raw table name, so an add and the matching
/// drop always agree on the name.
pub struct SchemaManager<'a> {
    backend: &'a dyn SchemaBackend,
    config: MigrationConfig,
}

impl<'a> SchemaManager<'a> {
    /// Create a manager with the default configuration
    pub fn new(backend: &'a dyn SchemaBackend) -> Self {
        Self::with_config(backend, MigrationConfig::default())
    }

    pub fn with_config(backend: &'a dyn SchemaBackend, config: MigrationConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Get a reference to the underlying backend
    pub fn backend(&self) -> &dyn SchemaBackend {
        self.backend
    }

    /// Table name as it appears in issued operations
    pub fn wrap_table(&self, table: &str) -> String {
        table_name::auto_wrap(table, self.config.auto_wrap_table_names)
    }

    /// Table name as it exists in the database
    pub fn raw_table_name(&self, table: &str) -> String {
        self.backend.raw_table_name(&self.wrap_table(table))
    }

    fn execute(&self, operation: SchemaOperation) -> Result<(), ExecutionError> {
        log::debug!("{}", operation);
        self.backend.execute(&operation)
    }

    /// Create a table
    ///
    /// Without `options` the backend's default table options are used.
    pub fn create_table(
        &self,
        table: &str,
        columns: &[(String, String)],
        options: Option<&str>,
    ) -> Result<(), ExecutionError> {
        let options = match options {
            Some(options) => Some(options.to_string()),
            None => self.backend.default_table_options(),
        };
        self.execute(SchemaOperation::CreateTable {
            table: self.wrap_table(table),
            columns: columns.to_vec(),
            options,
        })
    }

    pub fn drop_table(&self, table: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::DropTable {
            table: self.wrap_table(table),
        })
    }

    pub fn rename_table(&self, table: &str, new_name: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::RenameTable {
            table: self.wrap_table(table),
            new_name: self.wrap_table(new_name),
        })
    }

    pub fn truncate_table(&self, table: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::TruncateTable {
            table: self.wrap_table(table),
        })
    }

    pub fn add_column(&self, table: &str, column: &str, column_type: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::AddColumn {
            table: self.wrap_table(table),
            column: column.to_string(),
            column_type: column_type.to_string(),
        })
    }

    pub fn drop_column(&self, table: &str, column: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::DropColumn {
            table: self.wrap_table(table),
            column: column.to_string(),
        })
    }

    pub fn rename_column(&self, table: &str, column: &str, new_name: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::RenameColumn {
            table: self.wrap_table(table),
            column: column.to_string(),
            new_name: new_name.to_string(),
        })
    }

    pub fn alter_column(&self, table: &str, column: &str, column_type: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::AlterColumn {
            table: self.wrap_table(table),
            column: column.to_string(),
            column_type: column_type.to_string(),
        })
    }

    pub fn create_index(
        &self,
        name: &str,
        table: &str,
        columns: impl Into<ColumnList>,
        unique: bool,
    ) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::CreateIndex {
            name: name.to_string(),
            table: self.wrap_table(table),
            columns: columns.into(),
            unique,
        })
    }

    pub fn drop_index(&self, name: &str, table: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::DropIndex {
            name: name.to_string(),
            table: self.wrap_table(table),
        })
    }

    /// Add a foreign key; both `table` and `ref_table` are wrapped
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key(
        &self,
        name: &str,
        table: &str,
        columns: impl Into<ColumnList>,
        ref_table: &str,
        ref_columns: impl Into<ColumnList>,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
    ) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::AddForeignKey {
            name: name.to_string(),
            table: self.wrap_table(table),
            columns: columns.into(),
            ref_table: self.wrap_table(ref_table),
            ref_columns: ref_columns.into(),
            on_delete,
            on_update,
        })
    }

    pub fn drop_foreign_key(&self, name: &str, table: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::DropForeignKey {
            name: name.to_string(),
            table: self.wrap_table(table),
        })
    }

    pub fn add_primary_key(
        &self,
        name: &str,
        table: &str,
        columns: impl Into<ColumnList>,
    ) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::AddPrimaryKey {
            name: name.to_string(),
            table: self.wrap_table(table),
            columns: columns.into(),
        })
    }

    pub fn drop_primary_key(&self, name: &str, table: &str) -> Result<(), ExecutionError> {
        self.execute(SchemaOperation::DropPrimaryKey {
            name: name.to_string(),
            table: self.wrap_table(table),
        })
    }

    /// Columns joined the way the backend lists them, then imploded for a name
    fn implode(&self, columns: &ColumnList) -> String {
        naming::implode_column_list(&self.backend.build_column_list(columns))
    }

    pub fn generate_index_name(&self, table: &str, columns: &ColumnList, prefix: &str) -> String {
        naming::index_name(&self.raw_table_name(table), &self.implode(columns), prefix)
    }

    pub fn generate_foreign_key_name(
        &self,
        table: &str,
        columns: &ColumnList,
        ref_table: &str,
        ref_columns: &ColumnList,
    ) -> String {
        naming::foreign_key_name(
            &self.raw_table_name(table),
            &self.implode(columns),
            &self.raw_table_name(ref_table),
            &self.implode(ref_columns),
        )
    }

    pub fn generate_primary_key_name(&self, table: &str, columns: &ColumnList) -> String {
        naming::index_name(
            &self.raw_table_name(table),
            &self.implode(columns),
            naming::PREFIX_PRIMARY_KEY,
        )
    }

    /// Create an index named `idx_<table>___<columns>` (`uidx_` when unique)
    pub fn create_index_auto_named(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
        unique: bool,
    ) -> Result<(), ExecutionError> {
        let columns = columns.into();
        let name = self.generate_index_name(table, &columns, naming::index_prefix(unique));
        self.create_index(&name, table, columns, unique)
    }

    /// Drop the index [`create_index_auto_named`](Self::create_index_auto_named) created
    pub fn drop_index_auto_named(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
        unique: bool,
    ) -> Result<(), ExecutionError> {
        let columns = columns.into();
        let name = self.generate_index_name(table, &columns, naming::index_prefix(unique));
        self.drop_index(&name, table)
    }

    /// Add a foreign key with a generated name
    ///
    /// With `create_index` a non-unique `fkidx_` index on `columns` is
    /// created first.
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key_auto_named(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
        ref_table: &str,
        ref_columns: impl Into<ColumnList>,
        create_index: bool,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
    ) -> Result<(), ExecutionError> {
        let columns = columns.into();
        let ref_columns = ref_columns.into();
        if create_index {
            let index_name = self.generate_index_name(table, &columns, PREFIX_FOREIGN_KEY_INDEX);
            self.create_index(&index_name, table, &columns, false)?;
        }
        let name = self.generate_foreign_key_name(table, &columns, ref_table, &ref_columns);
        self.add_foreign_key(&name, table, columns, ref_table, ref_columns, on_delete, on_update)
    }

    /// Drop the foreign key (and optionally the `fkidx_` index)
    /// [`add_foreign_key_auto_named`](Self::add_foreign_key_auto_named) created
    pub fn drop_foreign_key_auto_named(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
        ref_table: &str,
        ref_columns: impl Into<ColumnList>,
        drop_created_index: bool,
    ) -> Result<(), ExecutionError> {
        let columns = columns.into();
        let ref_columns = ref_columns.into();
        let name = self.generate_foreign_key_name(table, &columns, ref_table, &ref_columns);
        self.drop_foreign_key(&name, table)?;
        if drop_created_index {
            let index_name = self.generate_index_name(table, &columns, PREFIX_FOREIGN_KEY_INDEX);
            self.drop_index(&index_name, table)?;
        }
        Ok(())
    }

    pub fn add_primary_key_auto_named(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
    ) -> Result<(), ExecutionError> {
        let columns = columns.into();
        let name = self.generate_primary_key_name(table, &columns);
        self.add_primary_key(&name, table, columns)
    }

    pub fn drop_primary_key_auto_named(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
    ) -> Result<(), ExecutionError> {
        let columns = columns.into();
        let name = self.generate_primary_key_name(table, &columns);
        self.drop_primary_key(&name, table)
    }

    /// `ENUM(...)` column type with values quoted by the backend
    pub fn type_enum(
        &self,
        values: &[&str],
        default: Option<&str>,
        not_null: bool,
    ) -> Result<String, ColumnTypeError> {
        column_type::type_enum(values, default, not_null, |value| self.backend.quote_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_names_are_wrapped() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        manager.drop_table("post").unwrap();
        manager.rename_table("post", "{{%article}}").unwrap();
        assert_eq!(
            backend.operations(),
            vec![
                SchemaOperation::DropTable { table: "{{%post}}".into() },
                SchemaOperation::RenameTable {
                    table: "{{%post}}".into(),
                    new_name: "{{%article}}".into(),
                },
            ]
        );
    }

    #[test]
    fn test_wrapping_can_be_disabled() {
        let backend = RecordingBackend::new();
        let config = MigrationConfig {
            auto_wrap_table_names: false,
            ..MigrationConfig::default()
        };
        let manager = SchemaManager::with_config(&backend, config);
        manager.truncate_table("post").unwrap();
        assert_eq!(
            backend.operations(),
            vec![SchemaOperation::TruncateTable { table: "post".into() }]
        );
    }

    #[test]
    fn test_generated_names_use_raw_table_name() {
        let backend = RecordingBackend::with_prefix("tbl_");
        let manager = SchemaManager::new(&backend);
        let columns = ColumnList::from("title");
        assert_eq!(manager.raw_table_name("post"), "tbl_post");
        assert_eq!(manager.generate_index_name("post", &columns, "idx_"), "idx_tbl_post___title");
        assert_eq!(
            manager.generate_index_name("{{%post}}", &columns, "idx_"),
            "idx_tbl_post___title"
        );
    }

    #[test]
    fn test_backend_quoting_does_not_change_generated_names() {
        use crate::backend::SqlBackend;
        use crate::config::Dialect;

        let recording = RecordingBackend::new();
        let expected = SchemaManager::new(&recording);
        let columns = ColumnList::from(["post_id", "LOWER(slug)"]);
        let refs = ColumnList::from("id");

        for dialect in [Dialect::Mysql, Dialect::Postgres] {
            let backend = SqlBackend::new(|_: &str| -> Result<u64, ExecutionError> { Ok(0) }, dialect);
            assert_eq!(backend.build_column_list(&refs), dialect_quoted(dialect, "id"));
            let manager = SchemaManager::new(&backend);
            assert_eq!(
                manager.generate_index_name("post_tag", &columns, naming::PREFIX_UNIQUE_INDEX),
                "uidx_post_tag___post_id__LOWERslug"
            );
            assert_eq!(
                manager.generate_foreign_key_name("post_tag", &columns, "post", &refs),
                expected.generate_foreign_key_name("post_tag", &columns, "post", &refs)
            );
            assert_eq!(
                manager.generate_primary_key_name("post_tag", &columns),
                expected.generate_primary_key_name("post_tag", &columns)
            );
        }
    }

    fn dialect_quoted(dialect: crate::config::Dialect, name: &str) -> String {
        match dialect {
            crate::config::Dialect::Mysql => format!("`{name}`"),
            crate::config::Dialect::Postgres => format!("\"{name}\""),
        }
    }

    #[test]
    fn test_create_table_uses_backend_default_options() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let columns = vec![("id".to_string(), "pk".to_string())];
        manager.create_table("post", &columns, None).unwrap();
        manager.create_table("tag", &columns, Some("ENGINE=MyISAM")).unwrap();
        let ops = backend.operations();
        assert!(matches!(&ops[0], SchemaOperation::CreateTable { options: None, .. }));
        assert!(matches!(
            &ops[1],
            SchemaOperation::CreateTable { options: Some(o), .. } if o == "ENGINE=MyISAM"
        ));
    }

    #[test]
    fn test_type_enum_quotes_through_backend() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        assert_eq!(
            manager.type_enum(&["draft", "published"], Some("draft"), true).unwrap(),
            "ENUM('draft', 'published') NOT NULL DEFAULT 'draft'"
        );
        assert_eq!(
            manager.type_enum(&["draft"], None, true),
            Err(ColumnTypeError::NotNullWithoutDefault)
        );
    }
}
