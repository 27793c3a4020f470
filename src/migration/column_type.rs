//! Column type fragments
//!
//! ```rust
//! use tablewright::migration::column_type::{DEFAULT_TRUE, NOT_NULL};
//!
//! let is_active = format!("boolean{NOT_NULL}{DEFAULT_TRUE}");
//! assert_eq!(is_active, "boolean NOT NULL DEFAULT 1");
//! ```

use crate::migration::error::ColumnTypeError;

pub const NOT_NULL: &str = " NOT NULL";
pub const DEFAULT_NULL: &str = " DEFAULT NULL";
pub const DEFAULT_TRUE: &str = " DEFAULT 1";
pub const DEFAULT_FALSE: &str = " DEFAULT 0";
pub const DEFAULT_0: &str = " DEFAULT 0";
pub const DEFAULT_1: &str = " DEFAULT 1";
pub const DEFAULT_: &str = " DEFAULT ";

/// Build an `ENUM(...)` column type
///
/// `quote` turns a value into an SQL literal; the schema manager passes the
/// collaborator's quoting here.
pub fn type_enum<Q>(
    values: &[&str],
    default: Option<&str>,
    not_null: bool,
    quote: Q,
) -> Result<String, ColumnTypeError>
where
    Q: Fn(&str) -> String,
{
    if values.is_empty() {
        return Err(ColumnTypeError::NoValues);
    }
    match default {
        None if not_null => return Err(ColumnTypeError::NotNullWithoutDefault),
        Some(default) if !values.contains(&default) => {
            return Err(ColumnTypeError::DefaultNotInValues(default.to_string()))
        }
        _ => {}
    }

    let quoted: Vec<String> = values.iter().map(|value| quote(value)).collect();
    let mut result = format!("ENUM({})", quoted.join(", "));
    if not_null {
        result.push_str(NOT_NULL);
    }
    match default {
        None => result.push_str(DEFAULT_NULL),
        Some(default) => {
            result.push_str(DEFAULT_);
            result.push_str(&quote(default));
        }
    }
    Ok(result)
}
