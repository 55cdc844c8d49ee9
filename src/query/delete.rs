//! DELETE statement builder.

use crate::error::OrmError;
use crate::executor::Connection;
use crate::query::builder::{quote_ident, run_execute, Query};
use crate::query::condition::Condition;
use crate::schema::{metadata_for, Entity, TableMeta};
use std::marker::PhantomData;
use std::sync::Arc;

/// Fluent builder for DELETE statements over one entity's table.
///
/// With no predicate this deletes every row, so callers almost always want
/// at least one [`Condition`]. Deleting a specific tracked record goes
/// through [`Orm::delete`](crate::Orm::delete), which binds the baseline
/// primary key.
pub struct DeleteBuilder<E: Entity> {
    meta: Arc<TableMeta>,
    conditions: Vec<Condition>,
    _phantom: PhantomData<E>,
}

impl<E: Entity> DeleteBuilder<E> {
    /// Create a builder for the entity's table.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Configuration`] if the entity's metadata cannot be
    /// resolved.
    pub fn new() -> Result<Self, OrmError> {
        Ok(Self {
            meta: metadata_for::<E>()?,
            conditions: Vec::new(),
            _phantom: PhantomData,
        })
    }

    /// Add a predicate; multiple predicates conjoin with `AND`.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Emit the statement. Idempotent.
    #[must_use]
    pub fn build_query(&self) -> Query {
        let mut sql = format!("DELETE FROM {}", quote_ident(self.meta.table()));
        let mut params = Vec::new();
        for (i, cond) in self.conditions.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            cond.append_to(&mut sql, &mut params);
        }
        Query { sql, params }
    }

    /// Execute, returning the affected-row count.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`] on collaborator failure.
    pub fn execute<C: Connection>(self, conn: &C) -> Result<u64, OrmError> {
        run_execute(conn, &self.build_query())
    }
}
