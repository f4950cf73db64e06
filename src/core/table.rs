//! Index-based registry of state descriptors.
//!
//! State graphs are usually cyclic (idle -> active -> idle), so edges
//! reference their targets by [`StateId`] rather than by pointer. A table
//! is immutable once built and is meant to be shared, through an `Arc`,
//! by every machine that runs it.

use super::descriptor::{StateDescriptor, StateId};
use crate::builder::StateTableBuilder;

/// Immutable set of states that one or more machines run against.
pub struct StateTable<P, Env> {
    states: Vec<StateDescriptor<P, Env>>,
}

impl<P, Env> StateTable<P, Env> {
    /// Start building a table.
    pub fn builder() -> StateTableBuilder<P, Env> {
        StateTableBuilder::new()
    }

    pub(crate) fn from_states(states: Vec<StateDescriptor<P, Env>>) -> Self {
        Self { states }
    }

    pub fn get(&self, id: StateId) -> Option<&StateDescriptor<P, Env>> {
        self.states.get(id.index())
    }

    pub fn contains(&self, id: StateId) -> bool {
        id.index() < self.states.len()
    }

    /// Look a state up by its debug name.
    pub fn find(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .find(|state| state.name() == Some(name))
            .map(|state| state.id())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateDescriptor<P, Env>> + '_ {
        self.states.iter()
    }
}

impl<P, Env> std::fmt::Debug for StateTable<P, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.states.iter()).finish()
    }
}
