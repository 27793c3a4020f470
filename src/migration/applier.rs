//! Create / drop a whole table definition
//!
//! `up` walks `Validated -> TableCreated -> IndexesCreated -> ForeignKeysAdded`,
//! `down` walks `Validated -> ForeignKeysDropped -> TableDropped`. The first
//! backend error stops the walk; operations already issued are not undone.

use crate::migration::error::MigrationError;
use crate::migration::naming::{implode_columns, index_prefix, PREFIX_FOREIGN_KEY_INDEX};
use crate::migration::schema::{ForeignKeySpec, TableSchema};
use crate::migration::schema_manager::SchemaManager;
use crate::migration::validate::validate_table_schema;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStage {
    Validated,
    TableCreated,
    IndexesCreated,
    ForeignKeysAdded,
    ForeignKeysDropped,
    TableDropped,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            ApplyStage::Validated => "validated",
            ApplyStage::TableCreated => "table created",
            ApplyStage::IndexesCreated => "indexes created",
            ApplyStage::ForeignKeysAdded => "foreign keys added",
            ApplyStage::ForeignKeysDropped => "foreign keys dropped",
            ApplyStage::TableDropped => "table dropped",
        };
        f.write_str(stage)
    }
}

/// Applies a [`TableSchema`] through a [`SchemaManager`]
pub struct TableApplier<'m, 'a> {
    manager: &'m SchemaManager<'a>,
    schema: &'m TableSchema,
    create_indexes_before_adding_fk: bool,
}

impl<'m, 'a> TableApplier<'m, 'a> {
    /// Supporting indexes follow the manager's configuration
    pub fn new(manager: &'m SchemaManager<'a>, schema: &'m TableSchema) -> Self {
        Self {
            manager,
            schema,
            create_indexes_before_adding_fk: manager.config().create_indexes_before_adding_fk,
        }
    }

    /// Override supporting-index creation; `None` keeps the configured value
    pub fn create_indexes_before_adding_fk(mut self, create: Option<bool>) -> Self {
        if let Some(create) = create {
            self.create_indexes_before_adding_fk = create;
        }
        self
    }

    fn enter(&self, stage: ApplyStage) -> ApplyStage {
        log::debug!("table {}: {}", self.schema.name, stage);
        stage
    }

    /// Names for a foreign key's supporting index and constraint
    ///
    /// An explicit name is used for both.
    fn foreign_key_names(&self, table: &str, fk: &ForeignKeySpec) -> (String, String) {
        match &fk.name {
            Some(name) => (name.clone(), name.clone()),
            None => (
                self.manager
                    .generate_index_name(table, &fk.columns, PREFIX_FOREIGN_KEY_INDEX),
                self.manager
                    .generate_foreign_key_name(table, &fk.columns, &fk.ref_table, &fk.ref_columns),
            ),
        }
    }

    /// Create the table, its indexes and its foreign keys
    pub fn up(&self) -> Result<ApplyStage, MigrationError> {
        validate_table_schema(self.schema)?;
        self.enter(ApplyStage::Validated);

        let table = self.manager.wrap_table(&self.schema.name);
        self.manager
            .create_table(&table, &self.schema.columns, self.schema.options.as_deref())?;
        self.enter(ApplyStage::TableCreated);

        for index in &self.schema.indexes {
            let columns = index.columns();
            let name = self
                .manager
                .generate_index_name(&table, &columns, index_prefix(index.unique));
            self.manager.create_index(&name, &table, columns, index.unique)?;
        }
        self.enter(ApplyStage::IndexesCreated);

        // one supporting index per distinct column set
        let mut indexed = HashSet::new();
        for fk in &self.schema.foreign_keys {
            let (index_name, fk_name) = self.foreign_key_names(&table, fk);
            if self.create_indexes_before_adding_fk && indexed.insert(implode_columns(&fk.columns)) {
                self.manager
                    .create_index(&index_name, &table, &fk.columns, fk.unique)?;
            }
            self.manager.add_foreign_key(
                &fk_name,
                &table,
                &fk.columns,
                &fk.ref_table,
                &fk.ref_columns,
                Some(fk.resolved_on_delete()),
                Some(fk.resolved_on_update()),
            )?;
        }
        let stage = self.enter(ApplyStage::ForeignKeysAdded);

        log::info!(
            "Created table {} ({} index(es), {} foreign key(s))",
            table,
            self.schema.indexes.len(),
            self.schema.foreign_keys.len()
        );
        Ok(stage)
    }

    /// Drop the foreign keys in declaration order, then the table
    ///
    /// Supporting indexes go away with the table.
    pub fn down(&self) -> Result<ApplyStage, MigrationError> {
        validate_table_schema(self.schema)?;
        self.enter(ApplyStage::Validated);

        let table = self.manager.wrap_table(&self.schema.name);
        for fk in &self.schema.foreign_keys {
            let (_, fk_name) = self.foreign_key_names(&table, fk);
            self.manager.drop_foreign_key(&fk_name, &table)?;
        }
        self.enter(ApplyStage::ForeignKeysDropped);

        self.manager.drop_table(&table)?;
        let stage = self.enter(ApplyStage::TableDropped);

        log::info!("Dropped table {}", table);
        Ok(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::migration::error::{ColumnConfigError, ConfigurationError};

    fn post() -> TableSchema {
        TableSchema::new("post")
            .column("id", "pk")
            .column("author_id", "integer NOT NULL")
            .foreign_key(ForeignKeySpec::new("author_id", "user", "id"))
    }

    #[test]
    fn test_up_reaches_final_stage() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let schema = post();
        assert_eq!(TableApplier::new(&manager, &schema).up().unwrap(), ApplyStage::ForeignKeysAdded);
        assert_eq!(backend.kinds(), vec!["create table", "create index", "add foreign key"]);
    }

    #[test]
    fn test_down_reaches_final_stage() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let schema = post();
        assert_eq!(TableApplier::new(&manager, &schema).down().unwrap(), ApplyStage::TableDropped);
        assert_eq!(backend.kinds(), vec!["drop foreign key", "drop table"]);
    }

    #[test]
    fn test_override_disables_supporting_index() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let schema = post();
        TableApplier::new(&manager, &schema)
            .create_indexes_before_adding_fk(Some(false))
            .up()
            .unwrap();
        assert_eq!(backend.kinds(), vec!["create table", "add foreign key"]);
    }

    #[test]
    fn test_invalid_schema_issues_nothing() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let schema = TableSchema::new("post");
        let err = TableApplier::new(&manager, &schema).up().unwrap_err();
        assert!(matches!(
            err,
            MigrationError::Configuration(ConfigurationError::Columns(ColumnConfigError::Empty))
        ));
        assert!(backend.is_empty());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ApplyStage::IndexesCreated.to_string(), "indexes created");
    }
}
