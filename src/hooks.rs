//! Lifecycle hook registration and dispatch.
//!
//! An explicit registration table maps (entity type, lifecycle phase) to an
//! ordered callback list, populated at configuration time and invoked by
//! direct calls — no discovery at statement time. Hooks receive the
//! statement's mutable [`Assignments`] (its `value`/`set` surface) and may
//! inject or override columns. They run in registration order, exactly once,
//! immediately before the statement is built; the first failure aborts the
//! statement before any SQL is sent and propagates unchanged.

use crate::error::OrmError;
use crate::query::Assignments;
use crate::schema::Entity;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

/// Lifecycle phase a hook attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeInsert,
    BeforeUpdate,
}

type HookFn = Box<dyn Fn(&mut Assignments) -> Result<(), OrmError> + Send + Sync>;

/// Ordered (entity type, phase) → callback table.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<(TypeId, Phase), Vec<HookFn>>,
}

impl HookRegistry {
    /// Append a hook for the entity type and phase.
    pub fn register<E: Entity>(
        &mut self,
        phase: Phase,
        hook: impl Fn(&mut Assignments) -> Result<(), OrmError> + Send + Sync + 'static,
    ) {
        self.hooks
            .entry((TypeId::of::<E>(), phase))
            .or_default()
            .push(Box::new(hook));
    }

    /// Run every registered hook for the entity type and phase, in
    /// registration order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the failing hook's error unchanged.
    pub fn dispatch<E: Entity>(
        &self,
        phase: Phase,
        assignments: &mut Assignments,
    ) -> Result<(), OrmError> {
        if let Some(hooks) = self.hooks.get(&(TypeId::of::<E>(), phase)) {
            for hook in hooks {
                hook(assignments)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .hooks
            .iter()
            .map(|((_, phase), hooks)| (*phase, hooks.len()))
            .collect();
        counts.sort_by_key(|(phase, _)| *phase as u8);
        f.debug_struct("HookRegistry").field("hooks", &counts).finish()
    }
}
