//! The capability interface every state provides to the engine.
//!
//! The engine calls a state's handler at four points of the transition
//! protocol: `guard` on a candidate target, `exit` on the state being left,
//! `enter` on the state being entered, and `internal` for self-loop edges.

use super::event::Event;

/// Behaviour attached to one state.
///
/// Every method has a default, so a state only implements the actions it
/// cares about. `guard` only reads the environment; the other actions may
/// mutate it.
///
/// Handlers are shared by every machine built from the same table, hence
/// the `Send + Sync` bound.
///
/// # Example
///
/// ```rust
/// use deferflow::core::{Event, StateHandler};
///
/// struct Keys {
///     pressed: usize,
/// }
///
/// struct KeyPress;
///
/// impl StateHandler<(), Keys> for KeyPress {
///     fn guard(&self, _event: &Event, env: &Keys) -> bool {
///         env.pressed == 1
///     }
///
///     fn enter(&self, _event: &Event, env: &mut Keys) {
///         env.pressed = 0;
///     }
/// }
/// ```
pub trait StateHandler<P, Env>: Send + Sync {
    /// Decide whether this state accepts a transition into it for `event`.
    fn guard(&self, _event: &Event<P>, _env: &Env) -> bool {
        true
    }

    /// Called after the machine has moved into this state.
    fn enter(&self, _event: &Event<P>, _env: &mut Env) {}

    /// Called while the machine is still in this state, just before it leaves.
    fn exit(&self, _event: &Event<P>, _env: &mut Env) {}

    /// Called for an event matched by a self-loop edge. No exit or enter fires.
    fn internal(&self, _event: &Event<P>, _env: &mut Env) {}
}

/// Handler with no behaviour: always accepts, ignores every action.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHandler;

impl<P, Env> StateHandler<P, Env> for NoopHandler {}

type GuardFn<P, Env> = Box<dyn Fn(&Event<P>, &Env) -> bool + Send + Sync>;
type ActionFn<P, Env> = Box<dyn Fn(&Event<P>, &mut Env) + Send + Sync>;

/// Handler assembled from closures.
///
/// Actions without a closure fall back to the trait defaults.
///
/// # Example
///
/// ```rust
/// use deferflow::core::{Event, EventId, FnHandler, StateHandler};
///
/// let handler = FnHandler::<(), Vec<&'static str>>::new()
///     .guard(|_event, log| log.is_empty())
///     .on_enter(|_event, log| log.push("entered"));
///
/// let event = Event::bare(EventId::new(1));
/// let mut log = Vec::new();
///
/// assert!(StateHandler::guard(&handler, &event, &log));
/// handler.enter(&event, &mut log);
/// assert!(!StateHandler::guard(&handler, &event, &log));
/// ```
pub struct FnHandler<P, Env> {
    guard: Option<GuardFn<P, Env>>,
    enter: Option<ActionFn<P, Env>>,
    exit: Option<ActionFn<P, Env>>,
    internal: Option<ActionFn<P, Env>>,
}

impl<P, Env> FnHandler<P, Env> {
    pub fn new() -> Self {
        Self {
            guard: None,
            enter: None,
            exit: None,
            internal: None,
        }
    }

    /// Set the guard predicate.
    pub fn guard<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Event<P>, &Env) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(predicate));
        self
    }

    pub fn on_enter<F>(mut self, action: F) -> Self
    where
        F: Fn(&Event<P>, &mut Env) + Send + Sync + 'static,
    {
        self.enter = Some(Box::new(action));
        self
    }

    pub fn on_exit<F>(mut self, action: F) -> Self
    where
        F: Fn(&Event<P>, &mut Env) + Send + Sync + 'static,
    {
        self.exit = Some(Box::new(action));
        self
    }

    pub fn on_internal<F>(mut self, action: F) -> Self
    where
        F: Fn(&Event<P>, &mut Env) + Send + Sync + 'static,
    {
        self.internal = Some(Box::new(action));
        self
    }
}

impl<P, Env> Default for FnHandler<P, Env> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, Env> StateHandler<P, Env> for FnHandler<P, Env> {
    fn guard(&self, event: &Event<P>, env: &Env) -> bool {
        self.guard.as_ref().is_none_or(|g| g(event, env))
    }

    fn enter(&self, event: &Event<P>, env: &mut Env) {
        if let Some(action) = &self.enter {
            action(event, env);
        }
    }

    fn exit(&self, event: &Event<P>, env: &mut Env) {
        if let Some(action) = &self.exit {
            action(event, env);
        }
    }

    fn internal(&self, event: &Event<P>, env: &mut Env) {
        if let Some(action) = &self.internal {
            action(event, env);
        }
    }
}
