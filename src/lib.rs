//! sqltx - transactional execution wrapper for SQL connection pools.
//!
//! Given a driver's connection pool, every unit of work - a single
//! statement or an arbitrary sequence supplied as a closure - acquires a
//! connection, optionally runs inside a transaction, and deterministically
//! releases the connection back to the pool on success and on every
//! failure path.
//!
//! ```ignore
//! let pool = sqltx::create_pool(&SqliteDriver, PoolConfig::new("sqlite:app.db"))?;
//!
//! // One-shot statement, no transaction:
//! let result = pool.insert("INSERT INTO t(x) VALUES(?)", params![1]).await?;
//!
//! // A transactional unit of work:
//! let id = pool
//!     .with_connection(
//!         |conn| {
//!             Box::pin(async move {
//!                 conn.insert("INSERT INTO t(x) VALUES(?)", params![1]).await?;
//!                 conn.update("UPDATE t SET x = x + 1", params![]).await?;
//!                 Ok(42)
//!             })
//!         },
//!         true,
//!     )
//!     .await?;
//! ```

pub mod adapter;
pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod models;

pub use adapter::Completion;
pub use config::PoolConfig;
pub use db::{Connection, PoolFacade, create_pool};
pub use error::{BoxDynError, DriverError, TxError, TxResult};
pub use models::{ExecuteResult, FieldMeta, QueryOutput, Row, SelectOutput, SqlParam, StatementResult};
