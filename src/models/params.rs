//! Statement parameter values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parameter value for parameterized statements.
///
/// Scalars cover strings, numbers, timestamps, and booleans; `Batch` holds
/// rows of scalars for bulk `VALUES` clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Timestamp value. Listed before `String` so ISO-8601 strings decode
    /// as timestamps.
    DateTime(DateTime<Utc>),
    /// String value
    String(String),
    /// Rows of values for bulk clauses.
    Batch(Vec<Vec<SqlParam>>),
}

impl SqlParam {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::DateTime(_) => "datetime",
            Self::String(_) => "string",
            Self::Batch(_) => "batch",
        }
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl From<Vec<Vec<SqlParam>>> for SqlParam {
    fn from(rows: Vec<Vec<SqlParam>>) -> Self {
        Self::Batch(rows)
    }
}

/// Build a `Vec<SqlParam>` from mixed literal values.
///
/// ```ignore
/// let params = params!["alice", 42, true];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        Vec::<$crate::models::SqlParam>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::models::SqlParam::from($value)),+]
    };
}
