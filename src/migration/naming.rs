//! Deterministic names for indexes, foreign keys and primary keys
//!
//! All functions here are pure. They take raw (already resolved) table names,
//! so the add and drop side of an operation regenerate identical names as long
//! as they are given the same table, columns and reference.

use crate::migration::columns::ColumnList;
use sha1::{Digest, Sha1};

/// Maximum identifier length; longer generated names are truncated and hashed
pub const MAX_NAME_LENGTH: usize = 64;

pub const PREFIX_FOREIGN_KEY: &str = "fk_";
pub const PREFIX_FOREIGN_KEY_INDEX: &str = "fkidx_";
pub const PREFIX_INDEX: &str = "idx_";
pub const PREFIX_UNIQUE_INDEX: &str = "uidx_";
pub const PREFIX_PRIMARY_KEY: &str = "pk_";

const STRIPPED_CHARS: [char; 10] = ['{', '}', '[', ']', '"', '\'', '(', ')', ' ', '`'];

/// Prefix for a declared index
pub fn index_prefix(unique: bool) -> &'static str {
    if unique {
        PREFIX_UNIQUE_INDEX
    } else {
        PREFIX_INDEX
    }
}

/// Join columns with `__`, dropping quoting, bracket and space characters
pub fn implode_columns(columns: &ColumnList) -> String {
    implode_column_list(&columns.joined())
}

/// Same as [`implode_columns`] for a comma-separated list a backend has
/// already built (and possibly quoted)
pub fn implode_column_list(built: &str) -> String {
    let stripped: String = built.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    stripped.split(',').collect::<Vec<_>>().join("__")
}

/// Bound `name` to [`MAX_NAME_LENGTH`]
///
/// A longer name keeps its first `MAX_NAME_LENGTH - 3 - 40` bytes followed by
/// `___` and the SHA-1 hex digest of the full name.
pub fn truncate_long_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LENGTH {
        return name.to_string();
    }
    let hash = format!("{:x}", Sha1::digest(name.as_bytes()));
    let mut keep = MAX_NAME_LENGTH - 3 - hash.len();
    while !name.is_char_boundary(keep) {
        keep -= 1;
    }
    format!("{}___{}", &name[..keep], hash)
}

/// `prefix + table + "___" + columns`
pub fn generate_index_name(raw_table: &str, columns: &ColumnList, prefix: &str) -> String {
    index_name(raw_table, &implode_columns(columns), prefix)
}

/// [`generate_index_name`] over columns already imploded
pub fn index_name(raw_table: &str, imploded: &str, prefix: &str) -> String {
    truncate_long_name(&format!("{prefix}{raw_table}___{imploded}"))
}

/// `fk_ + table + "__" + columns + "___" + ref_table + "__" + ref_columns`
pub fn generate_foreign_key_name(
    raw_table: &str,
    columns: &ColumnList,
    raw_ref_table: &str,
    ref_columns: &ColumnList,
) -> String {
    foreign_key_name(
        raw_table,
        &implode_columns(columns),
        raw_ref_table,
        &implode_columns(ref_columns),
    )
}

pub fn foreign_key_name(
    raw_table: &str,
    imploded: &str,
    raw_ref_table: &str,
    ref_imploded: &str,
) -> String {
    truncate_long_name(&format!(
        "{PREFIX_FOREIGN_KEY}{raw_table}__{imploded}___{raw_ref_table}__{ref_imploded}"
    ))
}

pub fn generate_primary_key_name(raw_table: &str, columns: &ColumnList) -> String {
    generate_index_name(raw_table, columns, PREFIX_PRIMARY_KEY)
}
