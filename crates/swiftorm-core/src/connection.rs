//! The boundary with the low-level database driver.

use std::future::Future;

use asupersync::{Cx, Outcome};

use crate::error::Error;
use crate::row::Row;
use crate::value::Value;

/// A wire-level driver: opens a connection and executes parameterized SQL.
///
/// Placeholders are positional (`$1`, `$2`, ...) and `params` binds them in
/// order. Failures are reported as [`Error::Connection`] or [`Error::Query`];
/// a [`QueryError`](crate::error::QueryError) should carry the backend's
/// SQLSTATE when one is available so the engine can classify it.
///
/// One driver instance is one logical connection. Callers serialize their
/// statements; a driver is not required to multiplex concurrent executions.
pub trait Driver: Send + Sync {
    /// Open the connection.
    fn connect(&self, cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Close the connection.
    fn close(&self, cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Execute one statement and return its rows (empty for statements that
    /// return nothing).
    fn execute(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, Error>> + Send;
}
