//! Migration settings.
//!
//! [`MigrationConfig`] is read from the `[migration]` section of
//! `config/config.toml` (optional) overlaid with `TABLEWRIGHT__MIGRATION__*`
//! environment variables:
//!
//! ```toml
//! [migration]
//! auto_wrap_table_names = true
//! create_indexes_before_adding_fk = true
//! table_prefix = "tbl_"
//! dialect = "mysql"
//! charset = "utf8mb4"
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "TABLEWRIGHT";
const SECTION: &str = "migration";

/// SQL dialect rendered by the SQL backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MigrationConfig {
    /// Route every table name through `{{%name}}` wrapping
    #[serde(default = "default_true")]
    pub auto_wrap_table_names: bool,
    /// Create a supporting index before each foreign key, unless the table
    /// definition says otherwise
    #[serde(default = "default_true")]
    pub create_indexes_before_adding_fk: bool,
    #[serde(default)]
    pub table_prefix: String,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default = "default_charset")]
    pub charset: String,
}

fn default_true() -> bool {
    true
}

fn default_charset() -> String {
    "utf8".to_string()
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            auto_wrap_table_names: true,
            create_indexes_before_adding_fk: true,
            table_prefix: String::new(),
            dialect: Dialect::default(),
            charset: default_charset(),
        }
    }
}

impl MigrationConfig {
    /// Load from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load from the given file (optional) plus env vars
    ///
    /// A missing `[migration]` section yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env_source());

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if path.exists() {
                    log::warn!(
                        "failed to load {}, falling back to env: {}",
                        path.display(),
                        err
                    );
                }
                Config::builder()
                    .add_source(env_source())
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        match settings.get::<MigrationConfig>(SECTION) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Migration configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::default();
        assert!(config.auto_wrap_table_names);
        assert!(config.create_indexes_before_adding_fk);
        assert_eq!(config.table_prefix, "");
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.charset, "utf8");
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[migration]
table_prefix = "tbl_"
dialect = "mysql"
create_indexes_before_adding_fk = false
"#,
        );
        let config = MigrationConfig::load_from(file.path()).expect("load config");
        assert_eq!(config.table_prefix, "tbl_");
        assert_eq!(config.dialect, Dialect::Mysql);
        assert!(!config.create_indexes_before_adding_fk);
        assert!(config.auto_wrap_table_names);
        assert_eq!(config.charset, "utf8");
    }

    #[test]
    fn test_missing_section_gives_defaults() {
        let file = write_config("[database]\nurl = \"postgres://localhost\"\n");
        let config = MigrationConfig::load_from(file.path()).expect("load config");
        assert_eq!(config, MigrationConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = MigrationConfig::load_from(dir.path().join("absent.toml")).expect("load config");
        assert_eq!(config, MigrationConfig::default());
    }
}
