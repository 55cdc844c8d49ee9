//! SELECT statement builder and its terminal operations.

use crate::error::OrmError;
use crate::executor::{Connection, RowCursor, RowsOf};
use crate::paginate::Paginated;
use crate::query::builder::{open_rows, quote_ident, Query};
use crate::query::condition::Condition;
use crate::record::Tracked;
use crate::row::TrackedRows;
use crate::schema::{metadata_for, Entity, TableMeta};
use crate::value::ValueType;
use std::marker::PhantomData;
use std::sync::Arc;

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    #[must_use]
    fn sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Fluent builder for SELECT statements over one entity's table.
///
/// Clauses concatenate in a fixed order — select-list, FROM, WHERE,
/// ORDER BY, LIMIT, OFFSET — and omitted clauses emit nothing.
///
/// # Example
///
/// ```no_run
/// use rowboat::{Condition, Order, Orm, SelectBuilder};
/// # use rowboat::{ColumnType, Entity, FromRow, OrmError, Row, TableDef};
/// # struct Accounts;
/// # struct Account { id: i64 }
/// # impl FromRow for Account {
/// #     fn from_row(row: &Row) -> Result<Self, OrmError> { Ok(Account { id: row.get("id")? }) }
/// # }
/// # impl Entity for Accounts {
/// #     type Model = Account;
/// #     fn table_def() -> TableDef {
/// #         TableDef::new("accounts").column("id", ColumnType::BigInt).primary_key(&["id"])
/// #     }
/// # }
/// # fn demo(conn: &impl rowboat::Connection) -> Result<(), OrmError> {
/// let orm = Orm::new();
/// let active = orm
///     .find::<Accounts>()?
///     .filter(Condition::eq("status", "active"))
///     .order_by("id", Order::Asc)
///     .limit(10)
///     .all(conn)?;
/// # Ok(()) }
/// ```
pub struct SelectBuilder<E: Entity> {
    meta: Arc<TableMeta>,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    order: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    _phantom: PhantomData<E>,
}

impl<E: Entity> SelectBuilder<E> {
    /// Create a builder selecting every declared column.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Configuration`] if the entity's metadata cannot be
    /// resolved.
    pub fn new() -> Result<Self, OrmError> {
        Ok(Self {
            meta: metadata_for::<E>()?,
            columns: Vec::new(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            _phantom: PhantomData,
        })
    }

    pub(crate) fn meta(&self) -> &Arc<TableMeta> {
        &self.meta
    }

    /// Restrict the select list. The default (no call) selects every
    /// declared column in metadata order.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Add a predicate; multiple predicates conjoin with `AND`.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.order.push((column.to_string(), order));
        self
    }

    /// Set LIMIT. `limit(0)` is a valid "fetch nothing" request.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Emit the statement. Idempotent; does not mutate the builder.
    #[must_use]
    pub fn build_query(&self) -> Query {
        self.build_with(self.limit)
    }

    fn select_list(&self) -> String {
        let cols: Vec<String> = if self.columns.is_empty() {
            self.meta.column_names().map(quote_ident).collect()
        } else {
            self.columns.iter().map(|c| quote_ident(c)).collect()
        };
        cols.join(", ")
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<crate::value::Value>) {
        for (i, cond) in self.conditions.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            cond.append_to(sql, params);
        }
    }

    fn build_with(&self, limit: Option<u64>) -> Query {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_list(),
            quote_ident(self.meta.table())
        );
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params);
        for (i, (column, order)) in self.order.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            sql.push_str(&quote_ident(column));
            sql.push(' ');
            sql.push_str(order.sql());
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        Query { sql, params }
    }

    /// Execute and map lazily: a finite, single-pass, non-restartable
    /// sequence of tracked records in cursor order.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`] if the collaborator fails to prepare
    /// or run the statement; mapping failures surface per item and fuse the
    /// sequence.
    pub fn rows<'conn, C: Connection>(
        &self,
        conn: &'conn C,
    ) -> Result<TrackedRows<E, RowsOf<'conn, C>>, OrmError> {
        let query = self.build_query();
        let cursor = open_rows(conn, &query)?;
        Ok(TrackedRows::new(
            Arc::clone(&self.meta),
            cursor,
            query.sql,
            query.params,
        ))
    }

    /// Execute and collect every matching record. Fail-fast: the first
    /// mapping error aborts the whole batch.
    ///
    /// # Errors
    ///
    /// See [`SelectBuilder::rows`].
    pub fn all<C: Connection>(&self, conn: &C) -> Result<Vec<Tracked<E>>, OrmError> {
        self.rows(conn)?.collect()
    }

    /// Execute with the effective limit clamped to one row and return the
    /// first record, if any.
    ///
    /// # Errors
    ///
    /// See [`SelectBuilder::rows`].
    pub fn one<C: Connection>(&self, conn: &C) -> Result<Option<Tracked<E>>, OrmError> {
        let limit = match self.limit {
            Some(0) => 0,
            _ => 1,
        };
        let query = self.build_with(Some(limit));
        let cursor = open_rows(conn, &query)?;
        let mut rows: TrackedRows<E, _> =
            TrackedRows::new(Arc::clone(&self.meta), cursor, query.sql, query.params);
        rows.next().transpose()
    }

    /// Execute a `SELECT COUNT(*)` with this builder's predicates.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`] on collaborator failure and
    /// [`OrmError::Mapping`] if the count column cannot be read back.
    pub fn count<C: Connection>(&self, conn: &C) -> Result<u64, OrmError> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_ident(self.meta.table()));
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params);
        let query = Query { sql, params };

        let mut cursor = open_rows(conn, &query)?;
        let row = cursor
            .next_row()
            .map_err(|e| OrmError::execution(&query.sql, &query.params, e))?
            .ok_or_else(|| {
                OrmError::execution(&query.sql, &query.params, "count query returned no row".into())
            })?;
        let value = row.value_at(0).ok_or_else(|| {
            OrmError::Mapping("count query returned an empty row".to_string())
        })?;
        let count = <i64 as ValueType>::from_value(value.clone()).ok_or_else(|| {
            OrmError::Mapping(format!("cannot coerce count value {value:?} to i64"))
        })?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Execute one over-fetching select (`LIMIT per_page + 1`), trim the
    /// extra row, and report whether a next page exists. `per_page = 0`
    /// still requests one row and yields an empty page whose `has_next`
    /// reflects whether any row matched.
    ///
    /// # Errors
    ///
    /// See [`SelectBuilder::rows`].
    pub fn paginate<C: Connection>(
        &self,
        conn: &C,
        per_page: u64,
    ) -> Result<Paginated<Tracked<E>>, OrmError> {
        let query = self.build_with(Some(per_page + 1));
        let cursor = open_rows(conn, &query)?;
        let rows: TrackedRows<E, _> =
            TrackedRows::new(Arc::clone(&self.meta), cursor, query.sql, query.params);
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::from_overfetch(entries, per_page))
    }
}
