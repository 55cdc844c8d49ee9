//! Statement-builder primitives shared by all statement kinds.
//!
//! [`Query`] is the finished product: SQL text with `$n` positional
//! placeholders plus the parameter list in placeholder order.
//! [`Assignments`] is the ordered column/value list that insert and update
//! builders (and lifecycle hooks) accumulate through `value`/`set`.

use crate::error::OrmError;
use crate::executor::{Connection, RowsOf, Statement};
use crate::value::Value;

/// A built, parameterized statement.
///
/// Building is a pure function of the builder's accumulated clauses: calling
/// it twice on an unmodified builder yields identical SQL text and parameter
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
}

impl Query {
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Quote an identifier with the crate's fixed convention: double quotes,
/// embedded quotes doubled. Applied to every identifier in every emitted
/// statement.
#[must_use]
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Ordered column → value assignments for INSERT/UPDATE statements.
///
/// Setting a column that is already present overrides the value in place, so
/// clause order stays deterministic when a lifecycle hook overrides a
/// caller-supplied column.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    entries: Vec<(String, Value)>,
}

impl Assignments {
    /// Set a column value, overriding in place if already present.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    /// Alias of [`Assignments::set`], matching insert-statement vocabulary.
    pub fn value(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.set(column, value)
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Prepare and run a statement expecting a row cursor. The statement handle
/// is scoped to this call; any collaborator failure comes back wrapped with
/// the SQL and parameters.
pub(crate) fn open_rows<'conn, C: Connection>(
    conn: &'conn C,
    query: &Query,
) -> Result<RowsOf<'conn, C>, OrmError> {
    log::debug!(
        "query: {} ({} param(s))",
        query.sql,
        query.params.len()
    );
    let stmt = conn
        .prepare(&query.sql)
        .map_err(|e| OrmError::execution(&query.sql, &query.params, e))?;
    stmt.query(&query.params)
        .map_err(|e| OrmError::execution(&query.sql, &query.params, e))
}

/// Prepare and run a statement expecting an affected-row count.
pub(crate) fn run_execute<C: Connection>(conn: &C, query: &Query) -> Result<u64, OrmError> {
    log::debug!(
        "execute: {} ({} param(s))",
        query.sql,
        query.params.len()
    );
    let stmt = conn
        .prepare(&query.sql)
        .map_err(|e| OrmError::execution(&query.sql, &query.params, e))?;
    stmt.execute(&query.params)
        .map_err(|e| OrmError::execution(&query.sql, &query.params, e))
}
