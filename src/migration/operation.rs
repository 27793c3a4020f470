//! Schema operations handed to the database collaborator
//!
//! Table names inside an operation are exactly what the migration produced
//! (wrapped as `{{%name}}` when auto-wrapping is on); resolving them is the
//! collaborator's job.

use crate::migration::columns::ColumnList;
use crate::migration::schema::ReferentialAction;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOperation {
    CreateTable {
        table: String,
        columns: Vec<(String, String)>,
        options: Option<String>,
    },
    DropTable {
        table: String,
    },
    RenameTable {
        table: String,
        new_name: String,
    },
    TruncateTable {
        table: String,
    },
    AddColumn {
        table: String,
        column: String,
        column_type: String,
    },
    DropColumn {
        table: String,
        column: String,
    },
    RenameColumn {
        table: String,
        column: String,
        new_name: String,
    },
    AlterColumn {
        table: String,
        column: String,
        column_type: String,
    },
    CreateIndex {
        name: String,
        table: String,
        columns: ColumnList,
        unique: bool,
    },
    DropIndex {
        name: String,
        table: String,
    },
    AddForeignKey {
        name: String,
        table: String,
        columns: ColumnList,
        ref_table: String,
        ref_columns: ColumnList,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
    },
    DropForeignKey {
        name: String,
        table: String,
    },
    AddPrimaryKey {
        name: String,
        table: String,
        columns: ColumnList,
    },
    DropPrimaryKey {
        name: String,
        table: String,
    },
}

impl SchemaOperation {
    /// Short operation name, e.g. `"create index"`
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaOperation::CreateTable { .. } => "create table",
            SchemaOperation::DropTable { .. } => "drop table",
            SchemaOperation::RenameTable { .. } => "rename table",
            SchemaOperation::TruncateTable { .. } => "truncate table",
            SchemaOperation::AddColumn { .. } => "add column",
            SchemaOperation::DropColumn { .. } => "drop column",
            SchemaOperation::RenameColumn { .. } => "rename column",
            SchemaOperation::AlterColumn { .. } => "alter column",
            SchemaOperation::CreateIndex { .. } => "create index",
            SchemaOperation::DropIndex { .. } => "drop index",
            SchemaOperation::AddForeignKey { .. } => "add foreign key",
            SchemaOperation::DropForeignKey { .. } => "drop foreign key",
            SchemaOperation::AddPrimaryKey { .. } => "add primary key",
            SchemaOperation::DropPrimaryKey { .. } => "drop primary key",
        }
    }

    /// Table the operation works on
    pub fn table(&self) -> &str {
        match self {
            SchemaOperation::CreateTable { table, .. }
            | SchemaOperation::DropTable { table }
            | SchemaOperation::RenameTable { table, .. }
            | SchemaOperation::TruncateTable { table }
            | SchemaOperation::AddColumn { table, .. }
            | SchemaOperation::DropColumn { table, .. }
            | SchemaOperation::RenameColumn { table, .. }
            | SchemaOperation::AlterColumn { table, .. }
            | SchemaOperation::CreateIndex { table, .. }
            | SchemaOperation::DropIndex { table, .. }
            | SchemaOperation::AddForeignKey { table, .. }
            | SchemaOperation::DropForeignKey { table, .. }
            | SchemaOperation::AddPrimaryKey { table, .. }
            | SchemaOperation::DropPrimaryKey { table, .. } => table,
        }
    }

    /// Constraint or index name, for operations that carry one
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaOperation::CreateIndex { name, .. }
            | SchemaOperation::DropIndex { name, .. }
            | SchemaOperation::AddForeignKey { name, .. }
            | SchemaOperation::DropForeignKey { name, .. }
            | SchemaOperation::AddPrimaryKey { name, .. }
            | SchemaOperation::DropPrimaryKey { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaOperation::CreateTable { table, .. }
            | SchemaOperation::DropTable { table }
            | SchemaOperation::TruncateTable { table } => write!(f, "{} {}", self.kind(), table),
            SchemaOperation::RenameTable { table, new_name } => {
                write!(f, "rename table {} to {}", table, new_name)
            }
            SchemaOperation::AddColumn { table, column, column_type }
            | SchemaOperation::AlterColumn { table, column, column_type } => {
                write!(f, "{} {} {} to table {}", self.kind(), column, column_type, table)
            }
            SchemaOperation::DropColumn { table, column } => {
                write!(f, "drop column {} from table {}", column, table)
            }
            SchemaOperation::RenameColumn { table, column, new_name } => {
                write!(f, "rename column {} in table {} to {}", column, table, new_name)
            }
            SchemaOperation::CreateIndex { name, table, columns, unique } => {
                let kind = if *unique { "create unique index" } else { "create index" };
                write!(f, "{} {} on {} ({})", kind, name, table, columns)
            }
            SchemaOperation::AddForeignKey { name, table, columns, ref_table, ref_columns, .. } => {
                write!(
                    f,
                    "add foreign key {}: {} ({}) references {} ({})",
                    name, table, columns, ref_table, ref_columns
                )
            }
            SchemaOperation::AddPrimaryKey { name, table, columns } => {
                write!(f, "add primary key {} on {} ({})", name, table, columns)
            }
            SchemaOperation::DropIndex { name, table }
            | SchemaOperation::DropForeignKey { name, table }
            | SchemaOperation::DropPrimaryKey { name, table } => {
                write!(f, "{} {} on {}", self.kind(), name, table)
            }
        }
    }
}
