//! Bundled SQLite driver, backed by sqlx.
//!
//! Same adaptation shape as the MySQL driver: every primitive spawns a task
//! that completes the handle once the sqlx call finishes.

use crate::adapter::Completion;
use crate::config::PoolConfig;
use crate::driver::classify::{StatementKind, classify};
use crate::driver::decode::RowDecode;
use crate::driver::{Driver, DriverConnection, DriverPool};
use crate::error::DriverError;
use crate::models::{ExecuteResult, QueryOutput, SqlParam, StatementResult};
use sqlparser::dialect::SQLiteDialect;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Executor, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type PooledConn = sqlx::pool::PoolConnection<Sqlite>;

/// SQLite driver library. Pass to [`create_pool`](crate::create_pool).
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    type Pool = SqliteDriverPool;

    fn create_pool(&self, config: &PoolConfig) -> Result<Self::Pool, DriverError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DriverError::new(format!("invalid SQLite connection URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(config.min_connections_or_default())
            .max_connections(config.max_connections_or_default())
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_or_default()))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_or_default())))
            .connect_lazy_with(options);

        Ok(SqliteDriverPool { pool })
    }
}

/// Pool handle owned by the SQLite driver.
#[derive(Debug, Clone)]
pub struct SqliteDriverPool {
    pool: SqlitePool,
}

impl SqliteDriverPool {
    /// The underlying sqlx pool, for driver-specific escape hatches.
    pub fn sqlx_pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl DriverPool for SqliteDriverPool {
    type Connection = SqliteDriverConnection;

    fn get_connection(&self, done: Completion<Self::Connection>) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            match pool.acquire().await {
                Ok(conn) => done.resolve(SqliteDriverConnection {
                    inner: Arc::new(Mutex::new(conn)),
                }),
                Err(e) => done.reject(DriverError::from(e)),
            }
        });
    }

    fn end(&self) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            pool.close().await;
        });
    }
}

/// One pooled SQLite connection on loan.
pub struct SqliteDriverConnection {
    inner: Arc<Mutex<PooledConn>>,
}

impl SqliteDriverConnection {
    fn simple(&self, sql: &'static str, done: Completion<()>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut conn = inner.lock().await;
            let result = (&mut **conn)
                .execute(sql)
                .await
                .map(|_| ())
                .map_err(DriverError::from);
            done.complete(result);
        });
    }
}

impl DriverConnection for SqliteDriverConnection {
    fn query(&self, sql: &str, params: Vec<SqlParam>, done: Completion<QueryOutput>) {
        let inner = Arc::clone(&self.inner);
        let sql = sql.to_owned();
        tokio::spawn(async move {
            let mut conn = inner.lock().await;
            done.complete(run_statement(&mut conn, &sql, &params).await);
        });
    }

    fn begin_transaction(&self, done: Completion<()>) {
        self.simple("BEGIN", done);
    }

    fn commit(&self, done: Completion<()>) {
        self.simple("COMMIT", done);
    }

    fn rollback(&self, done: Completion<()>) {
        self.simple("ROLLBACK", done);
    }

    fn release(self) {
        // Dropping the last Arc returns the sqlx connection to its pool.
    }
}

async fn run_statement(
    conn: &mut PooledConn,
    sql: &str,
    params: &[SqlParam],
) -> Result<QueryOutput, DriverError> {
    match classify(sql, &SQLiteDialect {}) {
        StatementKind::Fetch => {
            let rows: Vec<SqliteRow> = if params.is_empty() {
                (&mut **conn).fetch_all(sql).await.map_err(DriverError::from)?
            } else {
                bind_params(sqlx::query(sql), params)
                    .fetch_all(&mut **conn)
                    .await
                    .map_err(DriverError::from)?
            };
            let fields = rows.first().map(|r| r.field_meta()).unwrap_or_default();
            let rows = rows.iter().map(|r| r.to_row()).collect();
            Ok(QueryOutput {
                results: StatementResult::Rows(rows),
                fields,
            })
        }
        kind => {
            let result = if params.is_empty() {
                (&mut **conn).execute(sql).await.map_err(DriverError::from)?
            } else {
                bind_params(sqlx::query(sql), params)
                    .execute(&mut **conn)
                    .await
                    .map_err(DriverError::from)?
            };
            // last_insert_rowid is per-connection state; only an INSERT's
            // value is meaningful to report.
            let insert_id = match (kind, result.last_insert_rowid()) {
                (StatementKind::Insert, id) if id > 0 => Some(id as u64),
                _ => None,
            };
            Ok(QueryOutput {
                results: StatementResult::Done(ExecuteResult {
                    affected_rows: result.rows_affected(),
                    insert_id,
                }),
                fields: Vec::new(),
            })
        }
    }
}

fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = bind_param(query, param);
    }
    query
}

fn bind_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        SqlParam::Null => query.bind(None::<String>),
        SqlParam::Bool(v) => query.bind(*v),
        SqlParam::Int(v) => query.bind(*v),
        SqlParam::Float(v) => query.bind(*v),
        SqlParam::DateTime(v) => query.bind(*v),
        SqlParam::String(v) => query.bind(v.as_str()),
        // Batch rows bind flattened in row-major order; the statement must
        // carry one placeholder per value.
        SqlParam::Batch(rows) => {
            let mut query = query;
            for row in rows {
                for value in row {
                    query = bind_param(query, value);
                }
            }
            query
        }
    }
}
