//! Collaborator traits for statement execution.
//!
//! The core never owns a connection, a pool, or a transaction. It talks to
//! three narrow traits: `Connection` hands out scoped statement handles,
//! `Statement` binds positional parameters and runs, `RowCursor` yields rows
//! one at a time. Handles are plain values; dropping one releases it, so the
//! prepared-statement resource is freed on every exit path, including failures
//! during binding or execution.
//!
//! Trait methods return the collaborator's own boxed error. The core wraps
//! those into [`OrmError::Execution`](crate::OrmError) together with the SQL
//! text and parameter list before surfacing them.

use crate::error::DriverError;
use crate::row::Row;
use crate::value::Value;

/// A connection-scoped source of prepared statements.
pub trait Connection {
    /// The statement handle type, borrowing from this connection.
    type Stmt<'conn>: Statement
    where
        Self: 'conn;

    /// Prepare a statement for the given SQL text.
    fn prepare(&self, sql: &str) -> Result<Self::Stmt<'_>, DriverError>;
}

/// A prepared statement handle, consumed by execution.
///
/// Both terminals take `self`: a handle runs exactly once and is released
/// when it (or the cursor it produced) goes out of scope.
pub trait Statement {
    /// The row cursor type produced by `query`.
    type Rows: RowCursor;

    /// Bind positional parameters and execute, returning a row cursor.
    fn query(self, params: &[Value]) -> Result<Self::Rows, DriverError>;

    /// Bind positional parameters and execute, returning the affected-row
    /// count.
    fn execute(self, params: &[Value]) -> Result<u64, DriverError>;
}

/// A forward-only cursor over result rows.
pub trait RowCursor {
    /// Fetch the next row, or `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>, DriverError>;
}

/// The cursor type a connection produces for a query, spelled out once so
/// signatures elsewhere stay readable.
pub type RowsOf<'conn, C> = <<C as Connection>::Stmt<'conn> as Statement>::Rows;
