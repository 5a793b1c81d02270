//! The external driver boundary.
//!
//! Everything below this boundary - wire protocol, connection
//! establishment and teardown, pooling heuristics, timeouts - belongs to
//! the driver. The wrapper consumes only the callback-style primitives
//! declared here and adapts them with [`crate::adapter`].
//!
//! Two reference implementations backed by sqlx ship behind the `mysql`
//! and `sqlite` features.

use crate::adapter::Completion;
use crate::config::PoolConfig;
use crate::error::DriverError;
use crate::models::{QueryOutput, SqlParam};

#[cfg(any(feature = "mysql", feature = "sqlite"))]
mod classify;
#[cfg(any(feature = "mysql", feature = "sqlite"))]
mod decode;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MySqlDriver;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;

/// A database driver library, as handed to [`create_pool`](crate::create_pool).
pub trait Driver: Send + Sync + 'static {
    type Pool: DriverPool;

    /// Create a pool for the given configuration. Connection establishment
    /// itself may be deferred until the first acquisition.
    fn create_pool(&self, config: &PoolConfig) -> Result<Self::Pool, DriverError>;
}

/// A pool of reusable physical connections, owned by the driver.
///
/// The handle must support concurrent acquisition requests; interleaving
/// of outstanding requests is the driver's business.
pub trait DriverPool: Send + Sync + 'static {
    type Connection: DriverConnection;

    /// Request a connection on loan. The completion resolves with an
    /// exclusive connection or rejects when the pool cannot provide one.
    fn get_connection(&self, done: Completion<Self::Connection>);

    /// Tear down all pooled connections. Acquisitions already granted stay
    /// valid until released.
    fn end(&self);
}

/// One physical connection on loan from the pool.
///
/// Each statement or transaction primitive reports through its completion
/// handle. Operations are issued one at a time per connection; the wrapper
/// never overlaps them.
pub trait DriverConnection: Send + 'static {
    /// Execute one statement on the wire.
    fn query(&self, sql: &str, params: Vec<SqlParam>, done: Completion<QueryOutput>);

    /// Open a transaction on this connection.
    fn begin_transaction(&self, done: Completion<()>);

    /// Commit the open transaction.
    fn commit(&self, done: Completion<()>);

    /// Roll back the open transaction.
    fn rollback(&self, done: Completion<()>);

    /// Return the connection to the pool. Synchronous and infallible by
    /// contract; a driver that can fail here must absorb the failure.
    fn release(self);
}
