//! Builder for constructing state tables.

use crate::builder::error::BuildError;
use crate::core::{EventId, StateDescriptor, StateHandler, StateId, StateTable, TransitionEdge};
use std::borrow::Cow;

struct DeclaredState<P, Env> {
    name: Option<Cow<'static, str>>,
    handler: Box<dyn StateHandler<P, Env>>,
}

/// Builder for a [`StateTable`].
///
/// States are declared first and receive their [`StateId`]; edges and
/// deferrals are added afterwards and may point at any declared state,
/// including states declared later and the state itself. All references
/// are checked by [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use deferflow::builder::StateTableBuilder;
/// use deferflow::core::{EventId, NoopHandler};
///
/// const KEY_DOWN: EventId = EventId::new(1);
/// const KEY_UP: EventId = EventId::new(2);
///
/// let mut builder = StateTableBuilder::<(), ()>::new();
/// let idle = builder.state("Idle", NoopHandler);
/// let pressed = builder.state("Pressed", NoopHandler);
///
/// builder
///     .transition(idle, KEY_DOWN, pressed)
///     .transition(pressed, KEY_UP, idle)
///     .defer(pressed, KEY_DOWN);
///
/// let table = builder.build().unwrap();
/// assert_eq!(table.len(), 2);
/// ```
pub struct StateTableBuilder<P, Env> {
    states: Vec<DeclaredState<P, Env>>,
    edges: Vec<(StateId, TransitionEdge)>,
    deferrals: Vec<(StateId, EventId)>,
}

impl<P, Env> StateTableBuilder<P, Env> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            edges: Vec::new(),
            deferrals: Vec::new(),
        }
    }

    /// Declare a named state and return its id.
    pub fn state<H>(&mut self, name: impl Into<Cow<'static, str>>, handler: H) -> StateId
    where
        H: StateHandler<P, Env> + 'static,
    {
        self.declare(Some(name.into()), Box::new(handler))
    }

    /// Declare a state without a debug name.
    pub fn unnamed<H>(&mut self, handler: H) -> StateId
    where
        H: StateHandler<P, Env> + 'static,
    {
        self.declare(None, Box::new(handler))
    }

    fn declare(
        &mut self,
        name: Option<Cow<'static, str>>,
        handler: Box<dyn StateHandler<P, Env>>,
    ) -> StateId {
        let id = StateId::new(self.states.len());
        self.states.push(DeclaredState { name, handler });
        id
    }

    /// Append an edge to `from`'s edge list.
    ///
    /// Edges are tried in the order they are added. Add several edges with
    /// the same trigger to give one event prioritized alternative targets.
    pub fn transition(&mut self, from: StateId, trigger: EventId, to: StateId) -> &mut Self {
        self.edges.push((
            from,
            TransitionEdge {
                trigger,
                target: to,
            },
        ));
        self
    }

    /// Add a self-loop edge: `trigger` is handled by `state`'s `internal` action.
    pub fn internal(&mut self, state: StateId, trigger: EventId) -> &mut Self {
        self.transition(state, trigger, state)
    }

    /// Allow `state` to hold `event` for later replay when it cannot use it.
    pub fn defer(&mut self, state: StateId, event: EventId) -> &mut Self {
        if !self.deferrals.contains(&(state, event)) {
            self.deferrals.push((state, event));
        }
        self
    }

    /// Allow `state` to defer each of `events`.
    pub fn defer_all<I>(&mut self, state: StateId, events: I) -> &mut Self
    where
        I: IntoIterator<Item = EventId>,
    {
        for event in events {
            self.defer(state, event);
        }
        self
    }

    /// Number of states declared so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Build the table.
    /// Returns an error if no state was declared or a reference is invalid.
    pub fn build(self) -> Result<StateTable<P, Env>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let count = self.states.len();
        let check = |id: StateId| {
            if id.index() < count {
                Ok(())
            } else {
                Err(BuildError::UnknownState {
                    index: id,
                    states: count,
                })
            }
        };

        let mut descriptors: Vec<StateDescriptor<P, Env>> = self
            .states
            .into_iter()
            .enumerate()
            .map(|(index, declared)| StateDescriptor {
                id: StateId::new(index),
                name: declared.name,
                handler: declared.handler,
                edges: Vec::new(),
                deferrable: Vec::new(),
            })
            .collect();

        for (from, edge) in self.edges {
            check(from)?;
            check(edge.target)?;

            let state = &mut descriptors[from.index()];
            if state.edges.contains(&edge) {
                return Err(BuildError::DuplicateEdge {
                    state: state.label().into_owned(),
                    trigger: edge.trigger,
                    target: edge.target,
                });
            }
            state.edges.push(edge);
        }

        for (state, event) in self.deferrals {
            check(state)?;
            descriptors[state.index()].deferrable.push(event);
        }

        Ok(StateTable::from_states(descriptors))
    }
}

impl<P, Env> Default for StateTableBuilder<P, Env> {
    fn default() -> Self {
        Self::new()
    }
}
