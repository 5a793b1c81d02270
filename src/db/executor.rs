//! The transactional executor.
//!
//! One invocation runs the acquire / begin / execute / commit-or-rollback /
//! release protocol in strict order. There are no loops and no retries;
//! correctness hinges on the finalize and release steps running under every
//! combination of begin-failed / work-failed / work-succeeded /
//! commit-failed / rollback-failed.
//!
//! Release is owned by the connection facade's drop guard, so it executes
//! on every path reachable after a successful acquisition - including when
//! bookkeeping itself failed or the unit of work panicked.

use crate::adapter;
use crate::db::connection::Connection;
use crate::driver::DriverPool;
use crate::error::{TxError, TxResult};
use futures_util::future::BoxFuture;
use tracing::{Instrument, debug, debug_span, warn};
use uuid::Uuid;

/// Acquire a connection, optionally wrap the unit of work in a transaction,
/// and always return the connection to the pool.
pub(crate) async fn run<P, T, F>(pool: &P, work: F, with_transaction: bool) -> TxResult<T>
where
    P: DriverPool,
    F: for<'c> FnOnce(&'c mut Connection<P::Connection>) -> BoxFuture<'c, TxResult<T>>,
{
    let id = format!("uow_{}", Uuid::new_v4().simple());
    let span = debug_span!("unit_of_work", id = %id, transactional = with_transaction);

    async move {
        let raw = adapter::once(|done| pool.get_connection(done))
            .await
            .map_err(TxError::acquire)?;
        debug!("connection acquired");

        let mut conn = Connection::new(raw);
        let outcome = if with_transaction {
            run_transactional(&mut conn, work).await
        } else {
            work(&mut conn).await
        };

        // Unconditional; the facade's Drop covers panic unwinding too.
        conn.release();

        if let Err(err) = &outcome {
            warn!(error = %err, "unit of work failed");
        }
        outcome
    }
    .instrument(span)
    .await
}

/// Steps 3-5 of the protocol: begin, execute, then commit or roll back.
///
/// A begin failure feeds the rollback path exactly like a work failure, so
/// a transaction the driver may have half-opened is still torn down. Commit
/// failure discards the work's value: a committed-looking value from
/// uncommitted work must never reach the caller. Rollback failure wraps the
/// error that triggered it so neither is dropped.
async fn run_transactional<C, T, F>(conn: &mut Connection<C>, work: F) -> TxResult<T>
where
    C: crate::driver::DriverConnection,
    F: for<'c> FnOnce(&'c mut Connection<C>) -> BoxFuture<'c, TxResult<T>>,
{
    let attempt = match conn.begin().await {
        Ok(()) => work(conn).await,
        Err(source) => Err(TxError::Begin { source }),
    };

    match attempt {
        Ok(value) => match conn.commit().await {
            Ok(()) => Ok(value),
            Err(source) => Err(TxError::Commit { source }),
        },
        Err(primary) => match conn.rollback().await {
            Ok(()) => Err(primary),
            Err(source) => Err(TxError::Rollback {
                source,
                cause: Box::new(primary),
            }),
        },
    }
}
