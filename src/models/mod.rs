//! Data models: statement parameters and result shapes.

pub mod params;
pub mod result;

pub use params::SqlParam;
pub use result::{ExecuteResult, FieldMeta, QueryOutput, Row, SelectOutput, StatementResult};
