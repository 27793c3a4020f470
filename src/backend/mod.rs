//! Database collaborators
//!
//! A [`SchemaBackend`] executes the [`SchemaOperation`]s issued by the schema
//! manager. Two implementations ship with the crate:
//!
//! - [`RecordingBackend`]: keeps the operations in order, for dry runs and tests
//! - [`SqlBackend`]: renders each operation to PostgreSQL or MySQL and hands
//!   the statement to a [`SqlExecutor`]

mod recording;
mod sql;
pub mod typemap;

pub use recording::RecordingBackend;
pub use sql::{SqlBackend, SqlExecutor};

use crate::migration::columns::ColumnList;
use crate::migration::error::ExecutionError;
use crate::migration::operation::SchemaOperation;
use crate::migration::table_name;

/// Executes schema operations against a database
///
/// Only [`execute`](Self::execute) is required. The remaining methods have
/// defaults that suit a backend without a table prefix.
pub trait SchemaBackend {
    /// Execute one operation; the first error aborts the migration
    fn execute(&self, operation: &SchemaOperation) -> Result<(), ExecutionError>;

    /// Prefix substituted for `%` in wrapped table names
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Resolve `{{%name}}` to the name the table has in the database
    fn raw_table_name(&self, name: &str) -> String {
        table_name::resolve(name, self.table_prefix())
    }

    /// Quote a string as an SQL literal
    fn quote_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn build_column_list(&self, columns: &ColumnList) -> String {
        columns.joined()
    }

    /// Options appended to `CREATE TABLE` when a migration gives none
    fn default_table_options(&self) -> Option<String> {
        None
    }
}

impl<B: SchemaBackend + ?Sized> SchemaBackend for &B {
    fn execute(&self, operation: &SchemaOperation) -> Result<(), ExecutionError> {
        (**self).execute(operation)
    }

    fn table_prefix(&self) -> &str {
        (**self).table_prefix()
    }

    fn raw_table_name(&self, name: &str) -> String {
        (**self).raw_table_name(name)
    }

    fn quote_value(&self, value: &str) -> String {
        (**self).quote_value(value)
    }

    fn build_column_list(&self, columns: &ColumnList) -> String {
        (**self).build_column_list(columns)
    }

    fn default_table_options(&self) -> Option<String> {
        (**self).default_table_options()
    }
}
