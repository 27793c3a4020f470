//! Abstract column types
//!
//! Migrations may write portable types such as `pk`, `string(64)` or
//! `integer NOT NULL`. [`map_column_type`] turns them into the dialect's
//! physical type:
//!
//! - an exact match is replaced (`pk` => `serial NOT NULL PRIMARY KEY`)
//! - `name(args) rest` keeps the arguments (`string(64)` => `varchar(64)`,
//!   `text(10)` => `text(10)`); a multi-word type such as `double precision`
//!   cannot take arguments, so such input passes through
//! - `name rest` keeps the rest (`integer NOT NULL` => `integer NOT NULL`)
//!
//! Anything else passes through unchanged.

use crate::config::Dialect;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

static TYPE_WITH_ARGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\((.+?)\)(.*)$").expect("valid type pattern"));
static TYPE_WITH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s+").expect("valid type pattern"));
static ARGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.+\)").expect("valid args pattern"));
static LEADING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+").expect("valid word pattern"));

const POSTGRES_TYPES: &[(&str, &str)] = &[
    ("pk", "serial NOT NULL PRIMARY KEY"),
    ("upk", "serial NOT NULL PRIMARY KEY"),
    ("bigpk", "bigserial NOT NULL PRIMARY KEY"),
    ("ubigpk", "bigserial NOT NULL PRIMARY KEY"),
    ("char", "char(1)"),
    ("string", "varchar(255)"),
    ("text", "text"),
    ("tinyint", "smallint"),
    ("smallint", "smallint"),
    ("integer", "integer"),
    ("bigint", "bigint"),
    ("float", "double precision"),
    ("double", "double precision"),
    ("decimal", "numeric(10,0)"),
    ("datetime", "timestamp(0)"),
    ("timestamp", "timestamp(0)"),
    ("time", "time(0)"),
    ("date", "date"),
    ("binary", "bytea"),
    ("boolean", "boolean"),
    ("money", "numeric(19,4)"),
    ("json", "jsonb"),
];

const MYSQL_TYPES: &[(&str, &str)] = &[
    ("pk", "int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
    ("upk", "int(10) UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY"),
    ("bigpk", "bigint(20) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
    ("ubigpk", "bigint(20) UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY"),
    ("char", "char(1)"),
    ("string", "varchar(255)"),
    ("text", "text"),
    ("tinyint", "tinyint(3)"),
    ("smallint", "smallint(6)"),
    ("integer", "int(11)"),
    ("bigint", "bigint(20)"),
    ("float", "float"),
    ("double", "double"),
    ("decimal", "decimal(10,0)"),
    ("datetime", "datetime"),
    ("timestamp", "timestamp"),
    ("time", "time"),
    ("date", "date"),
    ("binary", "blob"),
    ("boolean", "tinyint(1)"),
    ("money", "decimal(19,4)"),
    ("json", "json"),
];

fn physical_type(dialect: Dialect, abstract_type: &str) -> Option<&'static str> {
    let types = match dialect {
        Dialect::Postgres => POSTGRES_TYPES,
        Dialect::Mysql => MYSQL_TYPES,
    };
    types
        .iter()
        .find(|(name, _)| *name == abstract_type)
        .map(|(_, physical)| *physical)
}

/// Map an abstract column type to the dialect's physical type
pub fn map_column_type(dialect: Dialect, column_type: &str) -> String {
    if let Some(physical) = physical_type(dialect, column_type) {
        return physical.to_string();
    }

    if let Some(caps) = TYPE_WITH_ARGS.captures(column_type) {
        return match physical_type(dialect, &caps[1]) {
            Some(physical) => {
                let args = format!("({})", &caps[2]);
                if ARGS.is_match(physical) {
                    format!("{}{}", ARGS.replace(physical, NoExpand(&args)), &caps[3])
                } else if LEADING_WORD.find(physical).map(|m| m.len()) == Some(physical.len()) {
                    // a bare type name takes the arguments as written
                    format!("{}{}{}", physical, args, &caps[3])
                } else {
                    column_type.to_string()
                }
            }
            None => column_type.to_string(),
        };
    }

    if let Some(caps) = TYPE_WITH_SUFFIX.captures(column_type) {
        if let Some(physical) = physical_type(dialect, &caps[1]) {
            return LEADING_WORD
                .replace(column_type, NoExpand(physical))
                .into_owned();
        }
    }

    column_type.to_string()
}
