//! Row mapping: raw result rows into typed, baseline-tracked records.
//!
//! A [`Row`] is the ordered column-name → [`Value`] pairs handed over by the
//! collaborator cursor. [`FromRow`] builds the typed model from one; the
//! crate then captures the baseline snapshot directly from the just-read raw
//! values (declared columns only), never by re-reading the constructed
//! instance. [`TrackedRows`] adapts a live cursor into a lazy, single-pass,
//! non-restartable sequence of tracked records.

use crate::error::OrmError;
use crate::executor::RowCursor;
use crate::record::Tracked;
use crate::schema::{Entity, TableMeta};
use crate::value::{Value, ValueType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One result row: ordered column-name → value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from (column, value) pairs in cursor order.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        let (columns, values) = pairs.into_iter().unzip();
        Self { columns, values }
    }

    /// Column names in cursor order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value for a column, if the row carries it.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Raw value by position.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Extract a column coerced to its semantic Rust type.
    ///
    /// Use `Option<T>` for nullable columns; a typed NULL maps to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Mapping`] if the column is missing from the row or
    /// the value cannot be coerced to `T`.
    pub fn get<T: ValueType>(&self, column: &str) -> Result<T, OrmError> {
        let value = self.value(column).ok_or_else(|| {
            OrmError::Mapping(format!("column {column:?} missing from result row"))
        })?;
        T::from_value(value.clone()).ok_or_else(|| {
            OrmError::Mapping(format!(
                "column {column:?}: cannot coerce {value:?} to {}",
                std::any::type_name::<T>()
            ))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Construct a typed model from a result row.
pub trait FromRow: Sized {
    /// Map one row into the model.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Mapping`] when a declared column is missing or a
    /// value cannot be coerced.
    fn from_row(row: &Row) -> Result<Self, OrmError>;
}

/// Map one row into a tracked record, snapshotting the baseline from the raw
/// values just read. Every declared column must be present; unrecognized row
/// columns are ignored.
pub(crate) fn map_tracked<E: Entity>(
    meta: &TableMeta,
    row: &Row,
) -> Result<Tracked<E>, OrmError> {
    let model = E::Model::from_row(row)?;
    let mut baseline = BTreeMap::new();
    for col in meta.columns() {
        let value = row.value(col.name()).ok_or_else(|| {
            OrmError::Mapping(format!(
                "declared column {:?} missing from result row for table {:?}",
                col.name(),
                meta.table()
            ))
        })?;
        baseline.insert(col.name().to_string(), value.clone());
    }
    Ok(Tracked::from_parts(model, baseline))
}

/// Lazy, single-pass mapping of a row cursor into tracked records.
///
/// The underlying cursor is consumed once, in original order. The first
/// mapping or cursor error fuses the iterator: fail-fast, no partial batch
/// when collected into a `Result<Vec<_>, _>`.
pub struct TrackedRows<E: Entity, R: RowCursor> {
    meta: Arc<TableMeta>,
    cursor: R,
    sql: String,
    params: Vec<Value>,
    done: bool,
    _phantom: std::marker::PhantomData<E>,
}

impl<E: Entity, R: RowCursor> TrackedRows<E, R> {
    pub(crate) fn new(meta: Arc<TableMeta>, cursor: R, sql: String, params: Vec<Value>) -> Self {
        Self {
            meta,
            cursor,
            sql,
            params,
            done: false,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E: Entity, R: RowCursor> Iterator for TrackedRows<E, R> {
    type Item = Result<Tracked<E>, OrmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_row() {
            Ok(Some(row)) => {
                let mapped = map_tracked::<E>(&self.meta, &row);
                if mapped.is_err() {
                    self.done = true;
                }
                Some(mapped)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(source) => {
                self.done = true;
                Some(Err(OrmError::execution(&self.sql, &self.params, source)))
            }
        }
    }
}
