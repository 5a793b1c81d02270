//! The transactional execution core.
//!
//! - Pool facade: owns the pool handle, convenience methods, teardown
//! - Transactional executor: the acquire/begin/execute/finalize/release
//!   state machine
//! - Connection facade: the statement vocabulary over one loaned connection

pub mod connection;
pub mod executor;
pub mod pool;

pub use connection::Connection;
pub use pool::{PoolFacade, create_pool};
