//! Tracked records: a typed model plus its immutable baseline snapshot.
//!
//! The baseline is the record's attribute values as last known to match
//! persisted storage. It is replaced wholesale on fetch, insert, or explicit
//! refetch — never mutated piecemeal — and it is what update and delete
//! statements target, so mutating the in-memory model (even its key fields)
//! can never retarget a different row.

use crate::query::Assignments;
use crate::schema::{Entity, TableMeta};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

/// A model instance paired with the baseline snapshot captured when it was
/// last read from storage.
///
/// Dereferences to the model for field access; use [`Tracked::model_mut`] to
/// mutate it (the baseline is unaffected by model mutation).
pub struct Tracked<E: Entity> {
    model: E::Model,
    baseline: BTreeMap<String, Value>,
}

impl<E: Entity> Tracked<E> {
    pub(crate) fn from_parts(model: E::Model, baseline: BTreeMap<String, Value>) -> Self {
        Self { model, baseline }
    }

    #[must_use]
    pub fn model(&self) -> &E::Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut E::Model {
        &mut self.model
    }

    #[must_use]
    pub fn into_model(self) -> E::Model {
        self.model
    }

    /// Baseline value for a column, if it was captured.
    #[must_use]
    pub fn baseline_value(&self, column: &str) -> Option<&Value> {
        self.baseline.get(column)
    }

    /// Primary-key (column, baseline value) pairs in declared key order.
    ///
    /// Mapping guarantees every declared column has a baseline entry, so this
    /// cannot miss for a record produced by the crate.
    pub(crate) fn baseline_primary_key(&self, meta: &TableMeta) -> Vec<(String, Value)> {
        meta.primary_key()
            .iter()
            .filter_map(|pk| {
                self.baseline
                    .get(*pk)
                    .map(|v| ((*pk).to_string(), v.clone()))
            })
            .collect()
    }
}

impl<E: Entity> Deref for Tracked<E> {
    type Target = E::Model;

    fn deref(&self) -> &Self::Target {
        &self.model
    }
}

impl<E: Entity> fmt::Debug for Tracked<E>
where
    E::Model: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("model", &self.model)
            .field("baseline", &self.baseline)
            .finish()
    }
}

/// A value holder for bean/struct-diff updates.
///
/// The holder applies every field it carries to the statement's assignment
/// list; presence, not equality with the current value, is the trigger. The
/// conventional shape is a struct of `Option` fields where `Some` means
/// "present":
///
/// ```
/// use rowboat::{Assignments, ColumnPatch};
///
/// #[derive(Default)]
/// struct AccountPatch {
///     name: Option<String>,
///     status: Option<String>,
/// }
///
/// impl ColumnPatch for AccountPatch {
///     fn apply_to(&self, assignments: &mut Assignments) {
///         if let Some(name) = &self.name {
///             assignments.set("name", name.clone());
///         }
///         if let Some(status) = &self.status {
///             assignments.set("status", status.clone());
///         }
///     }
/// }
/// ```
pub trait ColumnPatch {
    /// Apply every present field to the assignment list.
    fn apply_to(&self, assignments: &mut Assignments);
}
