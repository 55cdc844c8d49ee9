//! # rowboat
//!
//! A small synchronous row mapper and SQL statement engine: typed entity
//! metadata, fluent parameterized statement building, baseline-snapshot
//! dirty tracking for safe partial updates, lifecycle hooks, and over-fetch
//! pagination.
//!
//! Connections, pooling, transactions, and migrations are collaborator
//! concerns: the crate consumes narrow [`Connection`] / [`Statement`] /
//! [`RowCursor`] traits and never retains a handle beyond a single call.
//!
//! ```no_run
//! use rowboat::{ColumnType, Entity, FromRow, Orm, OrmError, Row, TableDef};
//!
//! struct Accounts;
//!
//! #[derive(Debug, Clone)]
//! struct Account {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl FromRow for Account {
//!     fn from_row(row: &Row) -> Result<Self, OrmError> {
//!         Ok(Account {
//!             id: row.get("id")?,
//!             name: row.get("name")?,
//!         })
//!     }
//! }
//!
//! impl Entity for Accounts {
//!     type Model = Account;
//!     fn table_def() -> TableDef {
//!         TableDef::new("accounts")
//!             .column("id", ColumnType::BigInt)
//!             .column("name", ColumnType::Text)
//!             .primary_key(&["id"])
//!     }
//! }
//!
//! fn demo(conn: &impl rowboat::Connection) -> Result<(), OrmError> {
//!     let orm = Orm::new();
//!     let created = orm.insert::<Accounts>()?.value("name", "John").execute_select(conn)?;
//!     orm.update(&created)?.set("name", "Taro").execute(conn)?;
//!     let fresh = orm.refetch(&created, conn)?;
//!     assert!(fresh.is_some());
//!     Ok(())
//! }
//! ```

pub mod error;
#[doc(inline)]
pub use error::{DriverError, OrmError};

pub mod value;
#[doc(inline)]
pub use value::{Value, ValueType};

pub mod schema;
#[doc(inline)]
pub use schema::{metadata_for, ColumnDef, ColumnType, Entity, TableDef, TableMeta};

pub mod executor;
#[doc(inline)]
pub use executor::{Connection, RowCursor, RowsOf, Statement};

pub mod row;
#[doc(inline)]
pub use row::{FromRow, Row, TrackedRows};

pub mod record;
#[doc(inline)]
pub use record::{ColumnPatch, Tracked};

pub mod query;
#[doc(inline)]
pub use query::{
    Assignments, Condition, DeleteBuilder, InsertBuilder, Op, Order, Query, SelectBuilder,
    UpdateBuilder,
};

pub mod hooks;
#[doc(inline)]
pub use hooks::{HookRegistry, Phase};

pub mod paginate;
#[doc(inline)]
pub use paginate::Paginated;

pub mod orm;
#[doc(inline)]
pub use orm::Orm;

#[cfg(test)]
mod tests_cfg;
