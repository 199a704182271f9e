//! Execution engine seam.
//!
//! birdql only assembles statements. Running them is delegated to an engine
//! implementing [`Executor`], which prepares SQL text into a [`PreparedQuery`]
//! that is then run with the parameter mapping produced by a build.

use crate::error::QbResult;
use crate::qb::Params;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A result row keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of a statement run without reading rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    /// Rows changed by the statement.
    pub changes: u64,
    /// Row id of the last inserted row, when the engine reports one.
    pub last_insert_id: Option<i64>,
}

/// An engine that turns SQL text into runnable statements.
///
/// Implement this for your driver; statements and hooks stay engine agnostic.
pub trait Executor {
    type Prepared: PreparedQuery;

    fn prepare(&self, sql: &str) -> QbResult<Self::Prepared>;
}

/// A prepared statement, run with a placeholder → value mapping.
pub trait PreparedQuery {
    /// First row, or `None` when the statement yields nothing.
    fn get(&mut self, params: &Params) -> QbResult<Option<Row>>;

    fn all(&mut self, params: &Params) -> QbResult<Vec<Row>>;

    fn run(&mut self, params: &Params) -> QbResult<ExecResult>;
}

impl<E: Executor + ?Sized> Executor for &E {
    type Prepared = E::Prepared;

    fn prepare(&self, sql: &str) -> QbResult<Self::Prepared> {
        (**self).prepare(sql)
    }
}

/// Deserialize a row into `T` by column name.
pub fn from_row<T: DeserializeOwned>(row: Row) -> QbResult<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}
