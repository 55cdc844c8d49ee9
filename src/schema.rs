//! Entity metadata: table descriptors, inheritance resolution, and the
//! process-wide registry.
//!
//! Entities describe themselves with a [`TableDef`] — an explicit descriptor
//! (table name, ordered columns, primary key, optional parent descriptor)
//! built once at configuration time. [`metadata_for`] resolves a descriptor
//! into an immutable [`TableMeta`] and caches it per entity type for the
//! lifetime of the process, so generated SQL is reproducible and metadata is
//! never re-derived per call.
//!
//! Inheritance is descriptor composition, not language inheritance: a child
//! descriptor references its parent's descriptor and resolution is a pure
//! function over the two. Columns resolve parent-then-child in declaration
//! order; a child column with the parent's name overrides it in place. The
//! primary key comes from whichever level declares it (child wins), and the
//! table name is the child's own, else the parent's.

use crate::error::OrmError;
use crate::row::FromRow;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Semantic type of a column, used by collaborators to keep NULLs typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    SmallInt,
    Int,
    BigInt,
    Double,
    Bool,
    Text,
    Bytes,
    Decimal,
    Date,
    Time,
    Timestamp,
    Uuid,
    Json,
}

/// A single column declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    name: &'static str,
    ty: ColumnType,
}

impl ColumnDef {
    #[must_use]
    pub fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.ty
    }
}

/// Declarative table descriptor for an entity type.
///
/// Built once in [`Entity::table_def`]; resolved and cached by
/// [`metadata_for`].
///
/// # Example
///
/// ```
/// use rowboat::{ColumnType, TableDef};
///
/// fn accounts_def() -> TableDef {
///     TableDef::new("accounts")
///         .column("id", ColumnType::BigInt)
///         .column("name", ColumnType::Text)
///         .primary_key(&["id"])
/// }
///
/// // A child sharing the parent's columns under its own table name.
/// fn archived_def() -> TableDef {
///     TableDef::extending(accounts_def).table("accounts_archive")
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableDef {
    table: Option<&'static str>,
    columns: Vec<ColumnDef>,
    primary_key: Vec<&'static str>,
    parent: Option<fn() -> TableDef>,
}

impl TableDef {
    /// Start a descriptor bound to the given table name.
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    /// Start a descriptor that composes another descriptor as its parent.
    ///
    /// The child inherits the parent's columns (and table name, unless it
    /// declares its own via [`TableDef::table`]).
    #[must_use]
    pub fn extending(parent: fn() -> TableDef) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Set or override the table name.
    #[must_use]
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Append a column declaration.
    #[must_use]
    pub fn column(mut self, name: &'static str, ty: ColumnType) -> Self {
        self.columns.push(ColumnDef::new(name, ty));
        self
    }

    /// Declare the primary-key column(s).
    #[must_use]
    pub fn primary_key(mut self, columns: &[&'static str]) -> Self {
        self.primary_key = columns.to_vec();
        self
    }
}

/// Resolved, immutable metadata for an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    table: &'static str,
    columns: Vec<ColumnDef>,
    primary_key: Vec<&'static str>,
}

impl TableMeta {
    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Declared columns in deterministic (parent-then-child) order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(ColumnDef::name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn primary_key(&self) -> &[&'static str] {
        &self.primary_key
    }
}

/// A typed record definition bound to a table.
///
/// `Model` is the plain struct rows map into; the entity type itself is a
/// unit marker carrying the descriptor.
pub trait Entity: 'static {
    /// The struct a result row is mapped into.
    type Model: FromRow;

    /// The declarative descriptor for this entity's table.
    fn table_def() -> TableDef;
}

fn resolve(def: TableDef, type_name: &str) -> Result<TableMeta, OrmError> {
    let parent = match def.parent {
        Some(parent_def) => Some(resolve(parent_def(), type_name)?),
        None => None,
    };

    let table = def
        .table
        .or_else(|| parent.as_ref().map(TableMeta::table))
        .ok_or_else(|| {
            OrmError::Configuration(format!("{type_name}: no table binding declared"))
        })?;

    let mut columns = parent.as_ref().map_or_else(Vec::new, |p| p.columns.clone());
    for col in def.columns {
        match columns.iter_mut().find(|c| c.name == col.name) {
            // Override in place so column order stays parent-then-child.
            Some(existing) => *existing = col,
            None => columns.push(col),
        }
    }
    if columns.is_empty() {
        return Err(OrmError::Configuration(format!(
            "{type_name}: zero columns declared"
        )));
    }

    let primary_key = if def.primary_key.is_empty() {
        parent.map(|p| p.primary_key).unwrap_or_default()
    } else {
        def.primary_key
    };
    for pk in &primary_key {
        if !columns.iter().any(|c| c.name == *pk) {
            return Err(OrmError::Configuration(format!(
                "{type_name}: primary-key column {pk:?} is not a declared column"
            )));
        }
    }

    Ok(TableMeta {
        table,
        columns,
        primary_key,
    })
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, Arc<TableMeta>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Resolve (once) and fetch the metadata for an entity type.
///
/// The first call for a type resolves its descriptor and caches the result
/// process-wide; concurrent first use is race-safe (first writer wins, later
/// resolvers discard their copy). Subsequent calls are a read-lock lookup.
///
/// # Errors
///
/// Returns [`OrmError::Configuration`] if the type has no table binding at
/// any level, declares zero columns, or names a primary-key column it does
/// not declare.
pub fn metadata_for<E: Entity>() -> Result<Arc<TableMeta>, OrmError> {
    let key = TypeId::of::<E>();
    if let Some(meta) = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(meta));
    }

    let resolved = Arc::new(resolve(E::table_def(), std::any::type_name::<E>())?);
    let mut map = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(map.entry(key).or_insert(resolved)))
}
