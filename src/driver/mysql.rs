//! Bundled MySQL driver, backed by sqlx.
//!
//! Adapts sqlx's async API to the trailing-callback convention of the
//! driver boundary: each primitive spawns a task that runs the operation
//! and reports through its completion handle. Operations are serialized per
//! connection with an async mutex; the wrapper never overlaps them, so the
//! lock is uncontended in practice.

use crate::adapter::Completion;
use crate::config::PoolConfig;
use crate::driver::classify::{StatementKind, classify};
use crate::driver::decode::RowDecode;
use crate::driver::{Driver, DriverConnection, DriverPool};
use crate::error::DriverError;
use crate::models::{ExecuteResult, QueryOutput, SqlParam, StatementResult};
use sqlparser::dialect::MySqlDialect;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Executor, MySql};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type PooledConn = sqlx::pool::PoolConnection<MySql>;

/// MySQL driver library. Pass to [`create_pool`](crate::create_pool).
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDriver;

impl Driver for MySqlDriver {
    type Pool = MySqlDriverPool;

    fn create_pool(&self, config: &PoolConfig) -> Result<Self::Pool, DriverError> {
        let options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| DriverError::new(format!("invalid MySQL connection URL: {}", e)))?
            .charset("utf8mb4");

        // Lazy: connections are established on first acquisition.
        let pool = MySqlPoolOptions::new()
            .min_connections(config.min_connections_or_default())
            .max_connections(config.max_connections_or_default())
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_or_default()))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_or_default())))
            .connect_lazy_with(options);

        Ok(MySqlDriverPool { pool })
    }
}

/// Pool handle owned by the MySQL driver.
#[derive(Debug, Clone)]
pub struct MySqlDriverPool {
    pool: MySqlPool,
}

impl MySqlDriverPool {
    /// The underlying sqlx pool, for driver-specific escape hatches.
    pub fn sqlx_pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl DriverPool for MySqlDriverPool {
    type Connection = MySqlDriverConnection;

    fn get_connection(&self, done: Completion<Self::Connection>) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            match pool.acquire().await {
                Ok(conn) => done.resolve(MySqlDriverConnection {
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

/// One pooled MySQL connection on loan.
pub struct MySqlDriverConnection {
    inner: Arc<Mutex<PooledConn>>,
}

impl MySqlDriverConnection {
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

impl DriverConnection for MySqlDriverConnection {
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
    match classify(sql, &MySqlDialect {}) {
        StatementKind::Fetch => {
            // Raw SQL when there is nothing to bind; some statements do not
            // support the prepared path.
            let rows: Vec<MySqlRow> = if params.is_empty() {
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
            let insert_id = match (kind, result.last_insert_id()) {
                (StatementKind::Insert, id) if id != 0 => Some(id),
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
    mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = bind_param(query, param);
    }
    query
}

fn bind_param<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
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
