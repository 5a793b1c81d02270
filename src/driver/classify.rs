//! Statement dispatch for the bundled sqlx drivers.
//!
//! sqlx separates fetching a result set from executing a statement, while
//! the driver boundary exposes a single `query` primitive. The AST decides
//! which sqlx path a statement takes; a leading-keyword check covers
//! dialect constructs sqlparser cannot parse.

use sqlparser::ast::Statement;
use sqlparser::dialect::Dialect;
use sqlparser::parser::Parser;

/// How a statement travels through sqlx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementKind {
    /// Produces a result set; goes through the fetch path.
    Fetch,
    /// INSERT specifically; the execute path, with an insert id to report.
    Insert,
    /// Everything else: the execute path, affected rows only.
    Execute,
}

pub(crate) fn classify(sql: &str, dialect: &dyn Dialect) -> StatementKind {
    match Parser::parse_sql(dialect, sql) {
        Ok(statements) => match statements.first() {
            Some(stmt) => classify_statement(stmt),
            None => StatementKind::Execute,
        },
        Err(_) => keyword_fallback(sql),
    }
}

fn classify_statement(stmt: &Statement) -> StatementKind {
    match stmt {
        Statement::Query(_)
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. }
        | Statement::ExplainTable { .. }
        | Statement::Explain { .. }
        | Statement::Pragma { .. } => StatementKind::Fetch,
        Statement::Insert(_) => StatementKind::Insert,
        _ => StatementKind::Execute,
    }
}

fn keyword_fallback(sql: &str) -> StatementKind {
    let head = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    match head.as_str() {
        "SELECT" | "SHOW" | "EXPLAIN" | "DESCRIBE" | "DESC" | "PRAGMA" | "WITH" | "VALUES"
        | "TABLE" => StatementKind::Fetch,
        "INSERT" => StatementKind::Insert,
        _ => StatementKind::Execute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::{MySqlDialect, SQLiteDialect};

    #[test]
    fn test_select_is_fetch() {
        assert_eq!(
            classify("SELECT * FROM users WHERE id = ?", &MySqlDialect {}),
            StatementKind::Fetch
        );
        assert_eq!(
            classify("  select 1", &SQLiteDialect {}),
            StatementKind::Fetch
        );
    }

    #[test]
    fn test_cte_is_fetch() {
        assert_eq!(
            classify(
                "WITH a AS (SELECT 1 AS x) SELECT x FROM a",
                &SQLiteDialect {}
            ),
            StatementKind::Fetch
        );
    }

    #[test]
    fn test_insert_is_insert() {
        assert_eq!(
            classify("INSERT INTO t(x) VALUES(?)", &MySqlDialect {}),
            StatementKind::Insert
        );
    }

    #[test]
    fn test_dml_and_ddl_are_execute() {
        assert_eq!(
            classify("UPDATE t SET x = 1", &MySqlDialect {}),
            StatementKind::Execute
        );
        assert_eq!(
            classify("DELETE FROM t WHERE x = ?", &SQLiteDialect {}),
            StatementKind::Execute
        );
        assert_eq!(
            classify("CREATE TABLE t (id INTEGER)", &SQLiteDialect {}),
            StatementKind::Execute
        );
    }

    #[test]
    fn test_unparseable_falls_back_to_keywords() {
        // Not valid SQL for the parser, but the verb decides the path.
        assert_eq!(
            classify("SHOW ENGINE INNODB STATUS NOW PLEASE", &MySqlDialect {}),
            StatementKind::Fetch
        );
        assert_eq!(
            classify("FLUSH PRIVILEGES OR SOMETHING", &MySqlDialect {}),
            StatementKind::Execute
        );
    }
}
