//! Statement building: fluent clause accumulation into parameterized SQL.
//!
//! Each builder accumulates clauses and emits a [`Query`] — SQL text with
//! `$n` positional placeholders plus the parameter list in placeholder
//! order. Emission order is fixed per statement kind; omitted clauses emit
//! nothing; identifiers use one quoting convention throughout.

pub mod builder;
#[doc(inline)]
pub use builder::{Assignments, Query};

pub mod condition;
#[doc(inline)]
pub use condition::{Condition, Op};

pub mod select;
#[doc(inline)]
pub use select::{Order, SelectBuilder};

pub mod insert;
#[doc(inline)]
pub use insert::InsertBuilder;

pub mod update;
#[doc(inline)]
pub use update::UpdateBuilder;

pub mod delete;
#[doc(inline)]
pub use delete::DeleteBuilder;
