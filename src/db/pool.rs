//! Pool facade.
//!
//! Owns the driver's pool handle and exposes the public surface: the
//! transactional executor plus five single-statement convenience methods,
//! each a one-shot unit of work with the transaction disabled. Destroying
//! the facade tears the pool down and fails every later call immediately,
//! without requesting a connection.

use crate::config::PoolConfig;
use crate::db::connection::Connection;
use crate::db::executor;
use crate::driver::{Driver, DriverPool};
use crate::error::{TxError, TxResult};
use crate::models::{ExecuteResult, QueryOutput, SelectOutput, SqlParam};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Create a pool facade over `driver` with the given configuration.
///
/// The configuration is validated here; connection establishment itself is
/// the driver's business and may be deferred until first use.
pub fn create_pool<D: Driver>(driver: &D, config: PoolConfig) -> TxResult<PoolFacade<D::Pool>> {
    config.validate()?;
    info!(url = %config.masked_url(), "creating pool");
    let pool = driver
        .create_pool(&config)
        .map_err(|e| TxError::config(e.message().to_string()))?;
    Ok(PoolFacade {
        pool: RwLock::new(Some(Arc::new(pool))),
    })
}

/// Facade over one driver pool.
///
/// The handle is the only resource shared across concurrent invocations;
/// each invocation's connection is exclusively its own until released.
pub struct PoolFacade<P: DriverPool> {
    pool: RwLock<Option<Arc<P>>>,
}

impl<P: DriverPool> PoolFacade<P> {
    /// Acquire a connection, run `work` against it, and release the
    /// connection back to the pool on every path.
    ///
    /// With `with_transaction` set, the work runs inside a transaction that
    /// commits when it succeeds and rolls back when it fails. Nested
    /// transactional calls sharing a connection are unsupported.
    pub async fn with_connection<T, F>(&self, work: F, with_transaction: bool) -> TxResult<T>
    where
        F: for<'c> FnOnce(&'c mut Connection<P::Connection>) -> BoxFuture<'c, TxResult<T>>,
    {
        let pool = { self.pool.read().await.clone() }.ok_or(TxError::PoolDestroyed)?;
        executor::run(pool.as_ref(), work, with_transaction).await
    }

    /// Execute one raw statement outside any transaction.
    pub async fn query(&self, sql: &str, params: Vec<SqlParam>) -> TxResult<QueryOutput>
    where
        P::Connection: Sync,
    {
        let sql = sql.to_owned();
        self.with_connection(
            move |conn| Box::pin(async move { conn.query(&sql, params).await }),
            false,
        )
        .await
    }

    /// Execute one read statement outside any transaction.
    pub async fn select(&self, sql: &str, params: Vec<SqlParam>) -> TxResult<SelectOutput>
    where
        P::Connection: Sync,
    {
        let sql = sql.to_owned();
        self.with_connection(
            move |conn| Box::pin(async move { conn.select(&sql, params).await }),
            false,
        )
        .await
    }

    /// Execute one INSERT outside any transaction.
    pub async fn insert(&self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult>
    where
        P::Connection: Sync,
    {
        let sql = sql.to_owned();
        self.with_connection(
            move |conn| Box::pin(async move { conn.insert(&sql, params).await }),
            false,
        )
        .await
    }

    /// Execute one UPDATE outside any transaction.
    pub async fn update(&self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult>
    where
        P::Connection: Sync,
    {
        let sql = sql.to_owned();
        self.with_connection(
            move |conn| Box::pin(async move { conn.update(&sql, params).await }),
            false,
        )
        .await
    }

    /// Execute one DELETE outside any transaction.
    pub async fn delete(&self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult>
    where
        P::Connection: Sync,
    {
        let sql = sql.to_owned();
        self.with_connection(
            move |conn| Box::pin(async move { conn.delete(&sql, params).await }),
            false,
        )
        .await
    }

    /// Alias of [`delete`](Self::delete).
    pub async fn del(&self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult>
    where
        P::Connection: Sync,
    {
        self.delete(sql, params).await
    }

    /// The raw driver pool handle, for driver-specific escape hatches.
    /// `None` once the pool has been destroyed.
    pub async fn get_pool(&self) -> Option<Arc<P>> {
        self.pool.read().await.clone()
    }

    /// Tear down the pool. Idempotent: calling it again is a no-op.
    ///
    /// Invocations already holding a connection finish normally; every new
    /// call fails with [`TxError::PoolDestroyed`] without requesting a
    /// connection.
    pub async fn destroy(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            info!("destroying pool");
            pool.end();
        }
    }

    /// True once [`destroy`](Self::destroy) has run.
    pub async fn is_destroyed(&self) -> bool {
        self.pool.read().await.is_none()
    }
}

impl<P: DriverPool> std::fmt::Debug for PoolFacade<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolFacade").finish_non_exhaustive()
    }
}
