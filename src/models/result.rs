//! Statement result shapes.
//!
//! A driver reports one [`StatementResult`] per executed statement: either
//! the rows a read produced or the affected-row metadata of a DML
//! statement. The connection facade reshapes that raw payload per
//! operation; the types here carry no behavior beyond that reshaping.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One result row, keyed by column name.
pub type Row = serde_json::Map<String, JsonValue>;

/// Column metadata reported alongside a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    /// Database-specific type (e.g., "int8", "varchar", "TEXT")
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable,
        }
    }
}

/// Affected-row metadata for a DML statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub affected_rows: u64,
    /// Auto-generated key of the inserted row, when the driver reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<u64>,
}

/// Raw payload of one executed statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatementResult {
    /// A result set, as produced by SELECT and friends.
    Rows(Vec<Row>),
    /// Affected-row metadata, as produced by DML.
    Done(ExecuteResult),
}

impl StatementResult {
    /// True when the payload is a result set.
    pub fn is_rows(&self) -> bool {
        matches!(self, Self::Rows(_))
    }
}

/// What [`query`](crate::db::Connection::query) returns: the raw payload
/// plus column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutput {
    pub results: StatementResult,
    pub fields: Vec<FieldMeta>,
}

/// What [`select`](crate::db::Connection::select) returns: the same
/// execution path as `query`, with the payload explicitly named `rows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOutput {
    pub rows: Vec<Row>,
    pub fields: Vec<FieldMeta>,
}
