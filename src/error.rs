//! Error types for the transactional pool wrapper.
//!
//! Two layers are distinguished: [`DriverError`] is the opaque failure a
//! driver primitive reports through its completion callback, and [`TxError`]
//! is the taxonomy surfaced to callers of the pool facade. Bookkeeping
//! failures (begin/commit/rollback) never silently overwrite the error that
//! triggered them: a failed rollback carries the primary error as its cause.

use thiserror::Error;

/// Boxed error type for failures raised by a unit of work.
pub type BoxDynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error reported by a driver primitive (query, begin, commit, rollback,
/// connection acquisition).
///
/// Drivers are external collaborators; their failures arrive as an opaque
/// message plus an optional SQLSTATE-style code.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    /// e.g. "42P01" for undefined table
    code: Option<String>,
}

impl DriverError {
    /// Create a driver error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create a driver error carrying a SQLSTATE-style code.
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// The driver's error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The SQLSTATE-style code, if the driver reported one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

#[derive(Error, Debug)]
pub enum TxError {
    /// The pool was destroyed; no connection was requested.
    #[error("pool destroyed")]
    PoolDestroyed,

    /// A connection could not be acquired from the pool.
    #[error("failed to acquire connection: {source}")]
    Acquire {
        #[source]
        source: DriverError,
    },

    /// The transaction could not be opened.
    #[error("failed to begin transaction: {source}")]
    Begin {
        #[source]
        source: DriverError,
    },

    /// A statement failed on the wire.
    #[error("statement failed: {source}")]
    Query {
        #[source]
        source: DriverError,
    },

    /// The unit of work succeeded but the commit did not. The work's value
    /// is discarded; uncommitted results never reach the caller.
    #[error("commit failed: {source}")]
    Commit {
        #[source]
        source: DriverError,
    },

    /// Rollback itself failed while cleaning up after `cause`.
    #[error("rollback failed: {source} (while handling: {cause})")]
    Rollback {
        #[source]
        source: DriverError,
        /// The begin/work error that triggered the rollback.
        cause: Box<TxError>,
    },

    /// The driver's result payload did not match the operation's shape,
    /// e.g. a row set where DML metadata was expected.
    #[error("unexpected result shape: {message}")]
    ResultShape { message: String },

    /// Invalid pool configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A failure raised by the unit of work itself.
    #[error("{0}")]
    App(#[source] BoxDynError),

    /// Invariant violation inside the wrapper.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl TxError {
    /// Wrap a driver acquisition failure.
    pub fn acquire(source: DriverError) -> Self {
        Self::Acquire { source }
    }

    /// Wrap a statement failure.
    pub fn query(source: DriverError) -> Self {
        Self::Query { source }
    }

    /// Create a result-shape error.
    pub fn result_shape(message: impl Into<String>) -> Self {
        Self::ResultShape {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an application-level failure raised by a unit of work.
    pub fn app(err: impl Into<BoxDynError>) -> Self {
        Self::App(err.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors raised by transaction bookkeeping (begin, commit,
    /// rollback) rather than by the unit of work or the statement itself.
    pub fn is_bookkeeping(&self) -> bool {
        matches!(
            self,
            Self::Begin { .. } | Self::Commit { .. } | Self::Rollback { .. }
        )
    }

    /// The error that triggered a failed rollback, if this is one.
    pub fn rollback_cause(&self) -> Option<&TxError> {
        match self {
            Self::Rollback { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Result type alias for pool and connection operations.
pub type TxResult<T> = Result<T, TxError>;

#[cfg(any(feature = "mysql", feature = "sqlite"))]
impl From<sqlx::Error> for DriverError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                match code {
                    Some(code) => DriverError::with_code(db_err.message(), code),
                    None => DriverError::new(db_err.message()),
                }
            }
            sqlx::Error::PoolTimedOut => DriverError::new("connection pool acquire timed out"),
            sqlx::Error::PoolClosed => DriverError::new("connection pool is closed"),
            sqlx::Error::Io(io_err) => DriverError::new(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => DriverError::new(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => DriverError::new(format!("protocol error: {}", msg)),
            sqlx::Error::Configuration(msg) => {
                DriverError::new(format!("configuration error: {}", msg))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DriverError::new(format!("failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DriverError::new(format!("decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DriverError::new("database worker crashed"),
            other => DriverError::new(other.to_string()),
        }
    }
}
