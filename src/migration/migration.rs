//! Migration traits

use super::applier::TableApplier;
use super::error::MigrationError;
use super::schema::{ForeignKeySpec, IndexSpec, TableSchema};
use super::schema_manager::SchemaManager;

/// Trait that all migrations must implement
pub trait Migration: Send + Sync {
    /// Get the migration name (human-readable identifier)
    fn name(&self) -> &str;

    /// Apply the migration
    fn up(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError>;

    /// Roll the migration back
    ///
    /// Migrations that do not override this cannot be reverted.
    fn down(&self, _manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        Err(MigrationError::Irreversible(self.name().to_string()))
    }
}

/// Structured description of a table to create
///
/// Wrap an implementation in [`CreateTable`] to get a [`Migration`] whose
/// `up` creates the table with its indexes and foreign keys and whose `down`
/// drops it again.
pub trait TableDefinition {
    /// Logical table name, without `{{% }}` markers
    fn table_name(&self) -> String;

    /// Column name => column type, in order
    fn table_columns(&self) -> Vec<(String, String)>;

    fn table_foreign_keys(&self) -> Vec<ForeignKeySpec> {
        Vec::new()
    }

    fn table_indexes(&self) -> Vec<IndexSpec> {
        Vec::new()
    }

    /// Per-table override; `None` defers to the manager's configuration
    fn create_indexes_before_adding_fk(&self) -> Option<bool> {
        None
    }

    /// Raw `CREATE TABLE` options; `None` uses the backend's default
    fn table_options(&self) -> Option<String> {
        None
    }

    fn schema(&self) -> TableSchema {
        TableSchema {
            name: self.table_name(),
            columns: self.table_columns(),
            foreign_keys: self.table_foreign_keys(),
            indexes: self.table_indexes(),
            options: self.table_options(),
        }
    }
}

/// A declarative schema is its own definition
impl TableDefinition for TableSchema {
    fn table_name(&self) -> String {
        self.name.clone()
    }

    fn table_columns(&self) -> Vec<(String, String)> {
        self.columns.clone()
    }

    fn table_foreign_keys(&self) -> Vec<ForeignKeySpec> {
        self.foreign_keys.clone()
    }

    fn table_indexes(&self) -> Vec<IndexSpec> {
        self.indexes.clone()
    }

    fn table_options(&self) -> Option<String> {
        self.options.clone()
    }

    fn schema(&self) -> TableSchema {
        self.clone()
    }
}

/// Migration creating the table a [`TableDefinition`] describes
pub struct CreateTable<T> {
    name: String,
    definition: T,
}

impl<T: TableDefinition> CreateTable<T> {
    /// The migration is named `create_<table>_table`
    pub fn new(definition: T) -> Self {
        let name = format!("create_{}_table", definition.table_name());
        Self { name, definition }
    }

    pub fn definition(&self) -> &T {
        &self.definition
    }
}

impl<T: TableDefinition + Send + Sync> Migration for CreateTable<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        let schema = self.definition.schema();
        TableApplier::new(manager, &schema)
            .create_indexes_before_adding_fk(self.definition.create_indexes_before_adding_fk())
            .up()?;
        Ok(())
    }

    fn down(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        let schema = self.definition.schema();
        TableApplier::new(manager, &schema).down()?;
        Ok(())
    }
}
