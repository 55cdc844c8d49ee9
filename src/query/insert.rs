//! INSERT statement builder.

use crate::error::OrmError;
use crate::executor::{Connection, RowCursor};
use crate::hooks::Phase;
use crate::orm::Orm;
use crate::query::builder::{open_rows, quote_ident, run_execute, Assignments, Query};
use crate::record::Tracked;
use crate::row::map_tracked;
use crate::schema::{metadata_for, Entity, TableMeta};
use std::marker::PhantomData;
use std::sync::Arc;

/// Fluent builder for one INSERT statement.
///
/// Registered before-insert hooks run exactly once, in registration order,
/// inside the terminal operation immediately before the statement is built;
/// a hook failure aborts before any SQL reaches the collaborator.
///
/// # Example
///
/// ```no_run
/// # use rowboat::{ColumnType, Entity, FromRow, Orm, OrmError, Row, TableDef};
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
/// let created = orm
///     .insert::<Accounts>()?
///     .value("name", "John")
///     .execute_select(conn)?;
/// // Generated key is immediately readable:
/// let _id = created.model().id;
/// # Ok(()) }
/// ```
pub struct InsertBuilder<'orm, E: Entity> {
    orm: &'orm Orm,
    meta: Arc<TableMeta>,
    assignments: Assignments,
    _phantom: PhantomData<E>,
}

impl<'orm, E: Entity> InsertBuilder<'orm, E> {
    pub(crate) fn new(orm: &'orm Orm) -> Result<Self, OrmError> {
        Ok(Self {
            orm,
            meta: metadata_for::<E>()?,
            assignments: Assignments::default(),
            _phantom: PhantomData,
        })
    }

    /// Supply a column value.
    #[must_use]
    pub fn value(mut self, column: &str, value: impl Into<crate::value::Value>) -> Self {
        self.assignments.value(column, value);
        self
    }

    /// Emit the statement for the currently accumulated values. Idempotent;
    /// hook dispatch happens in the terminal operations, not here.
    #[must_use]
    pub fn build_query(&self) -> Query {
        let mut sql = format!("INSERT INTO {}", quote_ident(self.meta.table()));
        let mut params = Vec::new();
        if self.assignments.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            let mut columns = Vec::new();
            let mut placeholders = Vec::new();
            for (column, value) in self.assignments.iter() {
                columns.push(quote_ident(column));
                params.push(value.clone());
                placeholders.push(format!("${}", params.len()));
            }
            sql.push_str(&format!(
                " ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            ));
        }
        Query { sql, params }
    }

    fn build_returning(&self) -> Query {
        let mut query = self.build_query();
        let returning: Vec<String> = self.meta.column_names().map(quote_ident).collect();
        query.sql.push_str(&format!(" RETURNING {}", returning.join(", ")));
        query
    }

    fn run_hooks(&mut self) -> Result<(), OrmError> {
        self.orm
            .hooks()
            .dispatch::<E>(Phase::BeforeInsert, &mut self.assignments)
    }

    /// Execute, returning the affected-row count.
    ///
    /// # Errors
    ///
    /// Returns the hook's error unchanged if a before-insert hook fails, or
    /// [`OrmError::Execution`] on collaborator failure.
    pub fn execute<C: Connection>(mut self, conn: &C) -> Result<u64, OrmError> {
        self.run_hooks()?;
        run_execute(conn, &self.build_query())
    }

    /// Execute with `RETURNING` all declared columns and map the stored row
    /// — including storage-generated values such as an auto-increment key —
    /// into a fresh tracked record.
    ///
    /// # Errors
    ///
    /// As [`InsertBuilder::execute`], plus [`OrmError::Mapping`] if the
    /// returned row cannot be mapped.
    pub fn execute_select<C: Connection>(mut self, conn: &C) -> Result<Tracked<E>, OrmError> {
        self.run_hooks()?;
        let query = self.build_returning();
        let mut cursor = open_rows(conn, &query)?;
        let row = cursor
            .next_row()
            .map_err(|e| OrmError::execution(&query.sql, &query.params, e))?
            .ok_or_else(|| {
                OrmError::execution(
                    &query.sql,
                    &query.params,
                    "insert returned no row".into(),
                )
            })?;
        map_tracked::<E>(&self.meta, &row)
    }
}
