//! Connection facade.
//!
//! Wraps one physical connection on loan from the pool behind a small
//! uniform vocabulary of statement operations. All five operations share
//! one execution primitive and differ only in how the raw payload is
//! reshaped for the caller; no operation retries, and a single invocation
//! issues exactly one statement on the wire.
//!
//! The facade doubles as the release guard: dropping it returns the
//! connection to the pool, so release runs on every exit path of the
//! executor without duplicated cleanup code.

use crate::adapter;
use crate::driver::DriverConnection;
use crate::error::{DriverError, TxError, TxResult};
use crate::models::{ExecuteResult, QueryOutput, SelectOutput, SqlParam, StatementResult};
use tracing::{debug, trace};

pub struct Connection<C: DriverConnection> {
    inner: Option<C>,
}

impl<C: DriverConnection> Connection<C> {
    pub(crate) fn new(raw: C) -> Self {
        Self { inner: Some(raw) }
    }

    fn raw(&self) -> TxResult<&C> {
        // `inner` is Some until release() or Drop consumes the facade.
        self.inner
            .as_ref()
            .ok_or_else(|| TxError::internal("connection already released"))
    }

    /// Execute a raw statement and return the driver's payload plus column
    /// metadata.
    pub async fn query(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<QueryOutput> {
        let raw = self.raw()?;
        debug!(sql = %sql, params = params.len(), "executing statement");
        adapter::once(|done| raw.query(sql, params, done))
            .await
            .map_err(TxError::query)
    }

    /// Execute a read statement; the payload is explicitly named `rows`.
    pub async fn select(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<SelectOutput> {
        let QueryOutput { results, fields } = self.query(sql, params).await?;
        match results {
            StatementResult::Rows(rows) => Ok(SelectOutput { rows, fields }),
            StatementResult::Done(_) => Err(TxError::result_shape(
                "statement produced no result set; use query or a DML operation",
            )),
        }
    }

    /// Execute an INSERT and return its affected-row metadata.
    pub async fn insert(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult> {
        self.execute(sql, params).await
    }

    /// Execute an UPDATE and return its affected-row metadata.
    pub async fn update(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult> {
        self.execute(sql, params).await
    }

    /// Execute a DELETE and return its affected-row metadata.
    pub async fn delete(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult> {
        self.execute(sql, params).await
    }

    /// Alias of [`delete`](Self::delete).
    pub async fn del(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult> {
        self.delete(sql, params).await
    }

    /// Shared execution path for the DML operations: same wire call as
    /// `query`, reshaped to drop column metadata since DML carries none.
    async fn execute(&mut self, sql: &str, params: Vec<SqlParam>) -> TxResult<ExecuteResult> {
        let QueryOutput { results, .. } = self.query(sql, params).await?;
        match results {
            StatementResult::Done(result) => Ok(result),
            StatementResult::Rows(_) => Err(TxError::result_shape(
                "statement produced a result set; use select",
            )),
        }
    }

    pub(crate) async fn begin(&mut self) -> Result<(), DriverError> {
        let raw = self
            .inner
            .as_ref()
            .ok_or_else(|| DriverError::new("connection already released"))?;
        debug!("begin transaction");
        adapter::once(|done| raw.begin_transaction(done)).await
    }

    pub(crate) async fn commit(&mut self) -> Result<(), DriverError> {
        let raw = self
            .inner
            .as_ref()
            .ok_or_else(|| DriverError::new("connection already released"))?;
        debug!("commit");
        adapter::once(|done| raw.commit(done)).await
    }

    pub(crate) async fn rollback(&mut self) -> Result<(), DriverError> {
        let raw = self
            .inner
            .as_ref()
            .ok_or_else(|| DriverError::new("connection already released"))?;
        debug!("rollback");
        adapter::once(|done| raw.rollback(done)).await
    }

    /// Return the connection to the pool.
    pub(crate) fn release(mut self) {
        if let Some(raw) = self.inner.take() {
            trace!("connection released");
            raw.release();
        }
    }
}

impl<C: DriverConnection> Drop for Connection<C> {
    fn drop(&mut self) {
        if let Some(raw) = self.inner.take() {
            trace!("connection released on drop");
            raw.release();
        }
    }
}

impl<C: DriverConnection> std::fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("released", &self.inner.is_none())
            .finish()
    }
}
