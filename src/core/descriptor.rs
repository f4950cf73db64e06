//! Static description of a single state.

use super::event::EventId;
use super::handler::StateHandler;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Index of a state inside its [`StateTable`](super::StateTable).
///
/// Ids are handed out by the table builder when a state is declared, so
/// edges can point at states declared later (or at their own state).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(usize);

impl StateId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An outgoing edge: when `trigger` arrives, try to move to `target`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub trigger: EventId,
    pub target: StateId,
}

/// One state: its handler, ordered edges, and deferrable event ids.
///
/// Edge order matters. The first edge whose trigger matches and whose
/// target guard accepts wins; later edges with the same trigger are the
/// fallbacks.
pub struct StateDescriptor<P, Env> {
    pub(crate) id: StateId,
    pub(crate) name: Option<Cow<'static, str>>,
    pub(crate) handler: Box<dyn StateHandler<P, Env>>,
    pub(crate) edges: Vec<TransitionEdge>,
    pub(crate) deferrable: Vec<EventId>,
}

impl<P, Env> StateDescriptor<P, Env> {
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Debug name, if one was given when the state was declared.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for logs: the debug name, or the index when unnamed.
    pub fn label(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name.as_ref()),
            None => Cow::Owned(self.id.to_string()),
        }
    }

    pub fn handler(&self) -> &dyn StateHandler<P, Env> {
        self.handler.as_ref()
    }

    pub fn edges(&self) -> &[TransitionEdge] {
        &self.edges
    }

    /// Edges triggered by `id`, in declaration order.
    pub fn edges_for(&self, id: EventId) -> impl Iterator<Item = &TransitionEdge> + '_ {
        self.edges.iter().filter(move |edge| edge.trigger == id)
    }

    pub fn deferrable(&self) -> &[EventId] {
        &self.deferrable
    }

    pub fn can_defer(&self, id: EventId) -> bool {
        self.deferrable.contains(&id)
    }
}

impl<P, Env> fmt::Debug for StateDescriptor<P, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("edges", &self.edges)
            .field("deferrable", &self.deferrable)
            .finish_non_exhaustive()
    }
}
