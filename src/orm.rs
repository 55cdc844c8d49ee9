//! The `Orm` facade: statement entry points plus hook configuration.

use crate::error::OrmError;
use crate::executor::Connection;
use crate::hooks::{HookRegistry, Phase};
use crate::query::{
    Assignments, Condition, DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder,
};
use crate::record::Tracked;
use crate::schema::{metadata_for, Entity};

/// Entry point for building statements against an entity set.
///
/// The `Orm` owns the lifecycle hook registry; hooks are registered up front
/// (configuration time) and dispatched by the insert/update builders it
/// hands out. It holds no connection — every terminal operation takes the
/// collaborator [`Connection`] explicitly and releases its statement handle
/// before returning.
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
/// let mut orm = Orm::new();
/// orm.before_insert::<Accounts>(|a| {
///     a.value("status", "created");
///     Ok(())
/// });
///
/// let record = orm.insert::<Accounts>()?.value("name", "John").execute_select(conn)?;
/// let fresh = orm.refetch(&record, conn)?; // None once the row is gone
/// # Ok(()) }
/// ```
#[derive(Debug, Default)]
pub struct Orm {
    hooks: HookRegistry,
}

impl Orm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Register a before-insert hook for an entity type.
    pub fn before_insert<E: Entity>(
        &mut self,
        hook: impl Fn(&mut Assignments) -> Result<(), OrmError> + Send + Sync + 'static,
    ) {
        self.hooks.register::<E>(Phase::BeforeInsert, hook);
    }

    /// Register a before-update hook for an entity type.
    pub fn before_update<E: Entity>(
        &mut self,
        hook: impl Fn(&mut Assignments) -> Result<(), OrmError> + Send + Sync + 'static,
    ) {
        self.hooks.register::<E>(Phase::BeforeUpdate, hook);
    }

    /// Start a SELECT over the entity's table.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Configuration`] if the entity's metadata cannot
    /// be resolved (fatal at first use of the type).
    pub fn find<E: Entity>(&self) -> Result<SelectBuilder<E>, OrmError> {
        SelectBuilder::new()
    }

    /// Start an INSERT into the entity's table.
    ///
    /// # Errors
    ///
    /// See [`Orm::find`].
    pub fn insert<E: Entity>(&self) -> Result<InsertBuilder<'_, E>, OrmError> {
        InsertBuilder::new(self)
    }

    /// Start an UPDATE targeting one tracked record by its baseline primary
    /// key.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Configuration`] if the entity declares no primary
    /// key or metadata cannot be resolved.
    pub fn update<'orm, E: Entity>(
        &'orm self,
        record: &Tracked<E>,
    ) -> Result<UpdateBuilder<'orm, E>, OrmError> {
        UpdateBuilder::new(self, record)
    }

    /// Delete one tracked record by its baseline primary key.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Configuration`] without a declared primary key,
    /// or [`OrmError::Execution`] on collaborator failure.
    pub fn delete<E: Entity, C: Connection>(
        &self,
        record: &Tracked<E>,
        conn: &C,
    ) -> Result<u64, OrmError> {
        let mut builder = DeleteBuilder::<E>::new()?;
        for (column, value) in self.baseline_key(record)? {
            builder = builder.filter(Condition::eq(column, value));
        }
        builder.execute(conn)
    }

    /// Re-read the record's current storage state into a new record sharing
    /// the same primary key. `Ok(None)` means the row no longer exists — a
    /// normal outcome, distinct from execution failure. The original record
    /// and its baseline are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`] on collaborator failure or
    /// [`OrmError::Mapping`] if the re-read row cannot be mapped.
    pub fn refetch<E: Entity, C: Connection>(
        &self,
        record: &Tracked<E>,
        conn: &C,
    ) -> Result<Option<Tracked<E>>, OrmError> {
        let mut builder = self.find::<E>()?;
        for (column, value) in self.baseline_key(record)? {
            builder = builder.filter(Condition::eq(column, value));
        }
        builder.one(conn)
    }

    fn baseline_key<E: Entity>(
        &self,
        record: &Tracked<E>,
    ) -> Result<Vec<(String, crate::value::Value)>, OrmError> {
        let meta = metadata_for::<E>()?;
        if meta.primary_key().is_empty() {
            return Err(OrmError::Configuration(format!(
                "cannot address rows of {:?}: no primary key declared",
                meta.table()
            )));
        }
        let key = record.baseline_primary_key(&meta);
        if key.len() != meta.primary_key().len() {
            return Err(OrmError::Configuration(format!(
                "record baseline for {:?} is missing primary-key column(s)",
                meta.table()
            )));
        }
        Ok(key)
    }
}
