//! Schema migrations
//!
//! This module provides:
//! - the [`Migration`] and [`TableDefinition`] traits
//! - [`SchemaManager`] with wrapped and auto-named schema operations
//! - deterministic index / foreign key / primary key naming
//! - validation of table definitions before anything is executed
//!
//! # Example
//!
//! ```rust
//! use tablewright::backend::RecordingBackend;
//! use tablewright::migration::{
//!     CreateTable, ForeignKeySpec, Migration, ReferentialAction, SchemaManager, TableDefinition,
//! };
//!
//! struct Post;
//!
//! impl TableDefinition for Post {
//!     fn table_name(&self) -> String {
//!         "post".into()
//!     }
//!
//!     fn table_columns(&self) -> Vec<(String, String)> {
//!         vec![
//!             ("id".into(), "pk".into()),
//!             ("author_id".into(), "integer NOT NULL".into()),
//!         ]
//!     }
//!
//!     fn table_foreign_keys(&self) -> Vec<ForeignKeySpec> {
//!         vec![ForeignKeySpec::new("author_id", "user", "id").on_delete(ReferentialAction::Cascade)]
//!     }
//! }
//!
//! let backend = RecordingBackend::new();
//! let manager = SchemaManager::new(&backend);
//! CreateTable::new(Post).up(&manager)?;
//! assert_eq!(backend.kinds(), ["create table", "create index", "add foreign key"]);
//! # Ok::<(), tablewright::migration::MigrationError>(())
//! ```

pub mod applier;
pub mod column_type;
pub mod columns;
pub mod definition;
pub mod error;
pub mod migration;
pub mod naming;
pub mod operation;
pub mod presets;
pub mod schema;
pub mod schema_manager;
pub mod table_name;
pub mod validate;

pub use applier::{ApplyStage, TableApplier};
pub use columns::ColumnList;
pub use error::{
    ColumnConfigError, ColumnTypeError, ConfigurationError, ExecutionError, ForeignKeyConfigError,
    IndexConfigError, MigrationError,
};
pub use migration::{CreateTable, Migration, TableDefinition};
pub use operation::SchemaOperation;
pub use presets::{AddColumns, DropColumns, JunctionTable};
pub use schema::{ForeignKeySpec, IndexSpec, ReferentialAction, TableSchema};
pub use schema_manager::SchemaManager;
