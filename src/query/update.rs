//! UPDATE statement builder with baseline-keyed targeting.

use crate::error::OrmError;
use crate::executor::Connection;
use crate::hooks::Phase;
use crate::orm::Orm;
use crate::query::builder::{quote_ident, run_execute, Assignments, Query};
use crate::record::{ColumnPatch, Tracked};
use crate::schema::{metadata_for, Entity, TableMeta};
use crate::value::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Fluent builder for one UPDATE statement targeting a tracked record.
///
/// The WHERE clause is fixed at construction from the record's *baseline*
/// primary-key value(s) — never the possibly-mutated current model — so an
/// in-memory key change cannot retarget the statement at a different row.
///
/// Two modes feed the SET clause and may be combined:
/// - explicit `(column, value)` pairs via [`UpdateBuilder::set`];
/// - a [`ColumnPatch`] holder via [`UpdateBuilder::set_patch`], which applies
///   every *present* field unconditionally.
///
/// An empty SET clause (after hooks) is a no-op success; nothing reaches the
/// collaborator. A successful update does not refresh the record's baseline;
/// storage-side defaults and triggers can change values the client cannot
/// predict, so callers refetch explicitly.
pub struct UpdateBuilder<'orm, E: Entity> {
    orm: &'orm Orm,
    meta: Arc<TableMeta>,
    assignments: Assignments,
    key: Vec<(String, Value)>,
    _phantom: PhantomData<E>,
}

impl<'orm, E: Entity> UpdateBuilder<'orm, E> {
    pub(crate) fn new(orm: &'orm Orm, record: &Tracked<E>) -> Result<Self, OrmError> {
        let meta = metadata_for::<E>()?;
        if meta.primary_key().is_empty() {
            return Err(OrmError::Configuration(format!(
                "cannot update {:?}: no primary key declared",
                meta.table()
            )));
        }
        let key = record.baseline_primary_key(&meta);
        if key.len() != meta.primary_key().len() {
            return Err(OrmError::Configuration(format!(
                "cannot update {:?}: record baseline is missing primary-key column(s)",
                meta.table()
            )));
        }
        Ok(Self {
            orm,
            meta,
            assignments: Assignments::default(),
            key,
            _phantom: PhantomData,
        })
    }

    /// Supply one explicit SET pair.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.assignments.set(column, value);
        self
    }

    /// Apply every present field of a patch holder.
    #[must_use]
    pub fn set_patch(mut self, patch: &impl ColumnPatch) -> Self {
        patch.apply_to(&mut self.assignments);
        self
    }

    /// Emit the statement, or `None` when the SET clause is empty (the
    /// execution-time no-op). Idempotent; hooks dispatch in
    /// [`UpdateBuilder::execute`], not here.
    #[must_use]
    pub fn build_query(&self) -> Option<Query> {
        if self.assignments.is_empty() {
            return None;
        }
        let mut sql = format!("UPDATE {} SET ", quote_ident(self.meta.table()));
        let mut params = Vec::new();
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            params.push(value.clone());
            sql.push_str(&format!("{} = ${}", quote_ident(column), params.len()));
        }
        for (i, (column, value)) in self.key.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            params.push(value.clone());
            sql.push_str(&format!("{} = ${}", quote_ident(column), params.len()));
        }
        Some(Query { sql, params })
    }

    /// Run before-update hooks, then execute. Returns the affected-row
    /// count, or `Ok(0)` without touching the connection when the SET clause
    /// is still empty after hooks.
    ///
    /// # Errors
    ///
    /// Returns the hook's error unchanged if a before-update hook fails, or
    /// [`OrmError::Execution`] on collaborator failure.
    pub fn execute<C: Connection>(mut self, conn: &C) -> Result<u64, OrmError> {
        self.orm
            .hooks()
            .dispatch::<E>(Phase::BeforeUpdate, &mut self.assignments)?;
        match self.build_query() {
            Some(query) => run_execute(conn, &query),
            None => {
                log::debug!(
                    "skipping update on {:?}: empty SET clause",
                    self.meta.table()
                );
                Ok(0)
            }
        }
    }
}
