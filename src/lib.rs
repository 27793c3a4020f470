//! # Tablewright
//!
//! Table-definition migrations with deterministic constraint naming.
//!
//! Migrations describe tables (columns, indexes, foreign keys) and issue
//! schema operations through a [`SchemaManager`](migration::SchemaManager).
//! Index, foreign key and primary key names are generated from the table and
//! columns, so the `down` side of a migration always finds what `up` created.
//! Operations are executed by a [`SchemaBackend`](backend::SchemaBackend):
//! either the SQL backend for PostgreSQL / MySQL or the recording backend for
//! dry runs.

pub mod backend;
pub mod config;
pub mod migration;

pub use config::{Dialect, MigrationConfig};
