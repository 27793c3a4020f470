//! SQL rendering backend
//!
//! Statements sea-query can express are built with it; the rest (column
//! type changes, primary keys, expression indexes) are written by hand with
//! the same identifier quoting.

use crate::backend::typemap::map_column_type;
use crate::backend::SchemaBackend;
use crate::config::{Dialect, MigrationConfig};
use crate::migration::columns::ColumnList;
use crate::migration::error::ExecutionError;
use crate::migration::operation::SchemaOperation;
use crate::migration::schema::ReferentialAction;
use sea_query::{
    Alias, ColumnDef, ForeignKey, ForeignKeyAction, Index, MysqlQueryBuilder,
    PostgresQueryBuilder, Table,
};

/// Runs one rendered statement
///
/// Any `Fn(&str) -> Result<u64, ExecutionError>` is an executor, which keeps
/// driver glue to a closure.
pub trait SqlExecutor {
    /// Execute `sql`, returning the number of affected rows
    fn execute(&self, sql: &str) -> Result<u64, ExecutionError>;
}

impl<F> SqlExecutor for F
where
    F: Fn(&str) -> Result<u64, ExecutionError>,
{
    fn execute(&self, sql: &str) -> Result<u64, ExecutionError> {
        self(sql)
    }
}

macro_rules! render {
    ($dialect:expr, $statement:expr) => {
        match $dialect {
            Dialect::Postgres => $statement.to_string(PostgresQueryBuilder),
            Dialect::Mysql => $statement.to_string(MysqlQueryBuilder),
        }
    };
}

/// Backend rendering operations to PostgreSQL or MySQL
pub struct SqlBackend<E> {
    executor: E,
    dialect: Dialect,
    prefix: String,
    charset: String,
}

impl<E> SqlBackend<E> {
    pub fn new(executor: E, dialect: Dialect) -> Self {
        Self {
            executor,
            dialect,
            prefix: String::new(),
            charset: "utf8".to_string(),
        }
    }

    /// Dialect, table prefix and charset from `config`
    pub fn from_config(executor: E, config: &MigrationConfig) -> Self {
        Self {
            executor,
            dialect: config.dialect,
            prefix: config.table_prefix.clone(),
            charset: config.charset.clone(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn quote_identifier(&self, name: &str) -> String {
        match self.dialect {
            Dialect::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
            Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
        }
    }

    fn quote_table(&self, table: &str) -> String {
        self.quote_identifier(&self.resolve_table(table))
    }

    fn resolve_table(&self, table: &str) -> String {
        crate::migration::table_name::resolve(table, &self.prefix)
    }

    fn table_alias(&self, table: &str) -> Alias {
        Alias::new(self.resolve_table(table))
    }

    fn quote_columns(&self, columns: &ColumnList) -> String {
        columns
            .iter()
            .map(|column| {
                if is_expression(column) {
                    column.to_string()
                } else {
                    self.quote_identifier(column)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn column_def(&self, name: &str, column_type: &str) -> ColumnDef {
        ColumnDef::new(Alias::new(name.to_string()))
            .custom(Alias::new(map_column_type(self.dialect, column_type)))
            .to_owned()
    }

    /// Render `operation` as one SQL statement
    pub fn render(&self, operation: &SchemaOperation) -> Result<String, ExecutionError> {
        let sql = match operation {
            SchemaOperation::CreateTable { table, columns, options } => {
                let mut statement = Table::create();
                statement.table(self.table_alias(table));
                for (name, column_type) in columns {
                    statement.col(self.column_def(name, column_type));
                }
                let sql = render!(self.dialect, statement);
                match options {
                    Some(options) if !options.trim().is_empty() => format!("{sql} {options}"),
                    _ => sql,
                }
            }
            SchemaOperation::DropTable { table } => {
                render!(self.dialect, Table::drop().table(self.table_alias(table)))
            }
            SchemaOperation::RenameTable { table, new_name } => render!(
                self.dialect,
                Table::rename().table(self.table_alias(table), self.table_alias(new_name))
            ),
            SchemaOperation::TruncateTable { table } => {
                render!(self.dialect, Table::truncate().table(self.table_alias(table)))
            }
            SchemaOperation::AddColumn { table, column, column_type } => render!(
                self.dialect,
                Table::alter()
                    .table(self.table_alias(table))
                    .add_column(self.column_def(column, column_type))
            ),
            SchemaOperation::DropColumn { table, column } => render!(
                self.dialect,
                Table::alter()
                    .table(self.table_alias(table))
                    .drop_column(Alias::new(column.clone()))
            ),
            SchemaOperation::RenameColumn { table, column, new_name } => render!(
                self.dialect,
                Table::alter()
                    .table(self.table_alias(table))
                    .rename_column(Alias::new(column.clone()), Alias::new(new_name.clone()))
            ),
            SchemaOperation::AlterColumn { table, column, column_type } => {
                let column_type = map_column_type(self.dialect, column_type);
                let column = self.quote_identifier(column);
                match self.dialect {
                    Dialect::Postgres => format!(
                        "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
                        self.quote_table(table),
                        column,
                        column_type
                    ),
                    Dialect::Mysql => format!(
                        "ALTER TABLE {} CHANGE {} {} {}",
                        self.quote_table(table),
                        column,
                        column,
                        column_type
                    ),
                }
            }
            SchemaOperation::CreateIndex { name, table, columns, unique } => {
                if columns.iter().any(is_expression) {
                    format!(
                        "CREATE {}INDEX {} ON {} ({})",
                        if *unique { "UNIQUE " } else { "" },
                        self.quote_identifier(name),
                        self.quote_table(table),
                        self.quote_columns(columns)
                    )
                } else {
                    let mut statement = Index::create();
                    statement.name(name.clone()).table(self.table_alias(table));
                    if *unique {
                        statement.unique();
                    }
                    for column in columns.iter() {
                        statement.col(Alias::new(column.to_string()));
                    }
                    render!(self.dialect, statement)
                }
            }
            SchemaOperation::DropIndex { name, table } => render!(
                self.dialect,
                Index::drop().name(name.clone()).table(self.table_alias(table))
            ),
            SchemaOperation::AddForeignKey {
                name,
                table,
                columns,
                ref_table,
                ref_columns,
                on_delete,
                on_update,
            } => {
                let mut statement = ForeignKey::create();
                statement
                    .name(name.clone())
                    .from_tbl(self.table_alias(table))
                    .to_tbl(self.table_alias(ref_table));
                for column in columns.iter() {
                    statement.from_col(Alias::new(column.to_string()));
                }
                for column in ref_columns.iter() {
                    statement.to_col(Alias::new(column.to_string()));
                }
                if let Some(action) = on_delete {
                    statement.on_delete(foreign_key_action(*action));
                }
                if let Some(action) = on_update {
                    statement.on_update(foreign_key_action(*action));
                }
                render!(self.dialect, statement)
            }
            SchemaOperation::DropForeignKey { name, table } => render!(
                self.dialect,
                ForeignKey::drop().name(name.clone()).table(self.table_alias(table))
            ),
            SchemaOperation::AddPrimaryKey { name, table, columns } => format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
                self.quote_table(table),
                self.quote_identifier(name),
                self.quote_columns(columns)
            ),
            SchemaOperation::DropPrimaryKey { name, table } => match self.dialect {
                Dialect::Postgres => format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    self.quote_table(table),
                    self.quote_identifier(name)
                ),
                Dialect::Mysql => format!("ALTER TABLE {} DROP PRIMARY KEY", self.quote_table(table)),
            },
        };
        Ok(sql)
    }
}

impl<E: SqlExecutor> SchemaBackend for SqlBackend<E> {
    fn execute(&self, operation: &SchemaOperation) -> Result<(), ExecutionError> {
        let sql = self.render(operation)?;
        log::debug!("[{}] {}", self.dialect, sql);
        self.executor.execute(&sql).map(|_| ())
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn quote_value(&self, value: &str) -> String {
        match self.dialect {
            Dialect::Postgres => format!("'{}'", value.replace('\'', "''")),
            Dialect::Mysql => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'")),
        }
    }

    fn build_column_list(&self, columns: &ColumnList) -> String {
        self.quote_columns(columns)
    }

    fn default_table_options(&self) -> Option<String> {
        match self.dialect {
            Dialect::Postgres => None,
            Dialect::Mysql => Some(format!(
                "CHARACTER SET {charset} COLLATE {charset}_unicode_ci ENGINE=InnoDB",
                charset = self.charset
            )),
        }
    }
}

fn is_expression(column: &str) -> bool {
    column.contains('(')
}

fn foreign_key_action(action: ReferentialAction) -> ForeignKeyAction {
    match action {
        ReferentialAction::Restrict => ForeignKeyAction::Restrict,
        ReferentialAction::Cascade => ForeignKeyAction::Cascade,
        ReferentialAction::NoAction => ForeignKeyAction::NoAction,
        ReferentialAction::SetDefault => ForeignKeyAction::SetDefault,
        ReferentialAction::SetNull => ForeignKeyAction::SetNull,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn noop(_: &str) -> Result<u64, ExecutionError> {
        Ok(0)
    }

    fn postgres() -> SqlBackend<fn(&str) -> Result<u64, ExecutionError>> {
        SqlBackend::new(noop as fn(&str) -> Result<u64, ExecutionError>, Dialect::Postgres)
            .with_prefix("tbl_")
    }

    fn mysql() -> SqlBackend<fn(&str) -> Result<u64, ExecutionError>> {
        SqlBackend::new(noop as fn(&str) -> Result<u64, ExecutionError>, Dialect::Mysql)
            .with_prefix("tbl_")
    }

    #[test]
    fn test_alter_column_per_dialect() {
        let op = SchemaOperation::AlterColumn {
            table: "{{%post}}".into(),
            column: "title".into(),
            column_type: "string(64) NOT NULL".into(),
        };
        assert_eq!(
            postgres().render(&op).unwrap(),
            "ALTER TABLE \"tbl_post\" ALTER COLUMN \"title\" TYPE varchar(64) NOT NULL"
        );
        assert_eq!(
            mysql().render(&op).unwrap(),
            "ALTER TABLE `tbl_post` CHANGE `title` `title` varchar(64) NOT NULL"
        );
    }

    #[test]
    fn test_primary_key_statements() {
        let add = SchemaOperation::AddPrimaryKey {
            name: "pk_tbl_post___id".into(),
            table: "{{%post}}".into(),
            columns: ColumnList::from("id"),
        };
        assert_eq!(
            postgres().render(&add).unwrap(),
            "ALTER TABLE \"tbl_post\" ADD CONSTRAINT \"pk_tbl_post___id\" PRIMARY KEY (\"id\")"
        );

        let drop = SchemaOperation::DropPrimaryKey {
            name: "pk_tbl_post___id".into(),
            table: "{{%post}}".into(),
        };
        assert_eq!(
            postgres().render(&drop).unwrap(),
            "ALTER TABLE \"tbl_post\" DROP CONSTRAINT \"pk_tbl_post___id\""
        );
        assert_eq!(mysql().render(&drop).unwrap(), "ALTER TABLE `tbl_post` DROP PRIMARY KEY");
    }

    #[test]
    fn test_expression_index_is_written_by_hand() {
        let op = SchemaOperation::CreateIndex {
            name: "uidx_tbl_user___LOWERemail".into(),
            table: "{{%user}}".into(),
            columns: ColumnList::from("LOWER(email)"),
            unique: true,
        };
        assert_eq!(
            postgres().render(&op).unwrap(),
            "CREATE UNIQUE INDEX \"uidx_tbl_user___LOWERemail\" ON \"tbl_user\" (LOWER(email))"
        );
    }

    #[test]
    fn test_mysql_table_options_and_quoting() {
        let backend = mysql().with_charset("utf8mb4");
        assert_eq!(
            backend.default_table_options().as_deref(),
            Some("CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci ENGINE=InnoDB")
        );
        assert_eq!(backend.quote_value("it's"), "'it\\'s'");
        assert_eq!(postgres().quote_value("it's"), "'it''s'");
        assert_eq!(postgres().default_table_options(), None);
    }

    #[test]
    fn test_execute_hands_statement_to_executor() {
        let statements = RefCell::new(Vec::new());
        let backend = SqlBackend::new(
            |sql: &str| -> Result<u64, ExecutionError> {
                statements.borrow_mut().push(sql.to_string());
                Ok(1)
            },
            Dialect::Postgres,
        );
        backend
            .execute(&SchemaOperation::DropPrimaryKey {
                name: "pk_post___id".into(),
                table: "{{%post}}".into(),
            })
            .unwrap();
        assert_eq!(
            statements.into_inner(),
            vec!["ALTER TABLE \"post\" DROP CONSTRAINT \"pk_post___id\"".to_string()]
        );
    }

    #[test]
    fn test_executor_error_is_returned() {
        let backend = SqlBackend::new(
            |_: &str| -> Result<u64, ExecutionError> {
                Err(ExecutionError::Query("relation does not exist".into()))
            },
            Dialect::Postgres,
        );
        let err = backend
            .execute(&SchemaOperation::DropPrimaryKey {
                name: "pk_post___id".into(),
                table: "{{%post}}".into(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "query error: relation does not exist");
    }
}
