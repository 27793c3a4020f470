//! Ready-made migrations for common changes

use super::error::MigrationError;
use super::migration::{Migration, TableDefinition};
use super::schema::{ForeignKeySpec, IndexSpec, ReferentialAction};
use super::schema_manager::SchemaManager;

/// Many-to-many table `<first>_<second>`
///
/// Columns `id`, `<first>_id`, `<second>_id` and `created_at`. Both reference
/// columns get a foreign key to `<table>.id` (`ON DELETE CASCADE`,
/// `ON UPDATE RESTRICT`); the pair is unique and each side is indexed with
/// `created_at`.
#[derive(Debug, Clone)]
pub struct JunctionTable {
    first: String,
    second: String,
}

impl JunctionTable {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    fn link(&self, table: &str) -> ForeignKeySpec {
        ForeignKeySpec::new(format!("{table}_id"), table, "id")
            .on_delete(ReferentialAction::Cascade)
            .on_update(ReferentialAction::Restrict)
    }
}

impl TableDefinition for JunctionTable {
    fn table_name(&self) -> String {
        format!("{}_{}", self.first, self.second)
    }

    fn table_columns(&self) -> Vec<(String, String)> {
        vec![
            ("id".to_string(), "pk".to_string()),
            (format!("{}_id", self.first), "integer NOT NULL".to_string()),
            (format!("{}_id", self.second), "integer NOT NULL".to_string()),
            ("created_at".to_string(), "integer NOT NULL".to_string()),
        ]
    }

    fn table_foreign_keys(&self) -> Vec<ForeignKeySpec> {
        vec![self.link(&self.first), self.link(&self.second)]
    }

    fn table_indexes(&self) -> Vec<IndexSpec> {
        vec![
            IndexSpec::new(format!("{}_id {}_id", self.first, self.second), true),
            IndexSpec::new(format!("{}_id created_at", self.first), false),
            IndexSpec::new(format!("{}_id created_at", self.second), false),
        ]
    }
}

/// Adds columns on `up`, drops them again on `down`
#[derive(Debug, Clone)]
pub struct AddColumns {
    name: String,
    table: String,
    columns: Vec<(String, String)>,
}

impl AddColumns {
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            name: format!("add_columns_to_{table}"),
            table,
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), column_type.into()));
        self
    }

    /// Replace the generated migration name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Migration for AddColumns {
    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        for (column, column_type) in &self.columns {
            manager.add_column(&self.table, column, column_type)?;
        }
        Ok(())
    }

    fn down(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        for (column, _) in &self.columns {
            manager.drop_column(&self.table, column)?;
        }
        Ok(())
    }
}

/// Drops columns on `up`; `down` adds them back with the recorded types
#[derive(Debug, Clone)]
pub struct DropColumns {
    name: String,
    table: String,
    columns: Vec<(String, String)>,
}

impl DropColumns {
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            name: format!("drop_columns_from_{table}"),
            table,
            columns: Vec::new(),
        }
    }

    /// `column_type` is what `down` recreates the column with
    pub fn column(mut self, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), column_type.into()));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Migration for DropColumns {
    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        for (column, _) in &self.columns {
            manager.drop_column(&self.table, column)?;
        }
        Ok(())
    }

    fn down(&self, manager: &SchemaManager<'_>) -> Result<(), MigrationError> {
        for (column, column_type) in &self.columns {
            manager.add_column(&self.table, column, column_type)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::migration::migration::CreateTable;
    use crate::migration::operation::SchemaOperation;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_junction_table_operations() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let migration = CreateTable::new(JunctionTable::new("post", "tag"));
        assert_eq!(migration.name(), "create_post_tag_table");
        migration.up(&manager).unwrap();

        let names: Vec<String> = backend
            .operations()
            .iter()
            .filter_map(|op| op.name().map(str::to_string))
            .collect();
        assert_eq!(
            names,
            vec![
                "uidx_post_tag___post_id__tag_id",
                "idx_post_tag___post_id__created_at",
                "idx_post_tag___tag_id__created_at",
                "fkidx_post_tag___post_id",
                "fk_post_tag__post_id___post__id",
                "fkidx_post_tag___tag_id",
                "fk_post_tag__tag_id___tag__id",
            ]
        );
        assert!(backend.operations().iter().any(|op| matches!(
            op,
            SchemaOperation::AddForeignKey {
                ref_table,
                on_delete: Some(ReferentialAction::Cascade),
                on_update: Some(ReferentialAction::Restrict),
                ..
            } if ref_table == "{{%tag}}"
        )));
    }

    #[test]
    fn test_add_and_drop_columns_invert_each_other() {
        let backend = RecordingBackend::new();
        let manager = SchemaManager::new(&backend);
        let add = AddColumns::new("post").column("slug", "string(128) NOT NULL");
        let drop = DropColumns::new("post").column("slug", "string(128) NOT NULL");

        add.up(&manager).unwrap();
        drop.down(&manager).unwrap();
        let ops = backend.take_operations();
        assert_eq!(ops[0], ops[1]);

        add.down(&manager).unwrap();
        drop.up(&manager).unwrap();
        let ops = backend.take_operations();
        assert_eq!(
            ops,
            vec![
                SchemaOperation::DropColumn { table: "{{%post}}".into(), column: "slug".into() };
                2
            ]
        );
        assert_eq!(add.name(), "add_columns_to_post");
        assert_eq!(drop.name(), "drop_columns_from_post");
    }
}
