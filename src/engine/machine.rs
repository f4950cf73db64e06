//! Runtime state machine instance.

use crate::config::{EngineConfig, QueueKind};
use crate::core::{Event, EventId, StateDescriptor, StateId, StateTable, TransitionLog};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use crate::engine::error::EngineError;
use crate::engine::queue::EventQueue;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identity of a machine instance, used in diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(Uuid);

impl MachineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One running state machine: the current state plus its two event queues.
///
/// The state table is shared and read-only; the queues and the current
/// state belong to this instance alone. Nothing here is synchronized, so
/// an owner that enqueues from several contexts must serialize access.
///
/// # Example
///
/// ```rust
/// use deferflow::builder::StateTableBuilder;
/// use deferflow::core::{EventId, NoopHandler};
/// use deferflow::engine::Machine;
/// use std::sync::Arc;
///
/// const GO: EventId = EventId::new(1);
///
/// let mut builder = StateTableBuilder::<(), ()>::new();
/// let idle = builder.state("Idle", NoopHandler);
/// let running = builder.state("Running", NoopHandler);
/// builder.transition(idle, GO, running);
/// let table = Arc::new(builder.build().unwrap());
///
/// let mut machine = Machine::with_defaults(table);
/// machine.init(idle).unwrap();
/// machine.enqueue(GO, ()).unwrap();
/// machine.process_events(&mut ()).unwrap();
///
/// assert!(machine.is_in_state(running));
/// ```
pub struct Machine<P = (), Env = ()> {
    pub(crate) id: MachineId,
    pub(crate) name: Option<String>,
    pub(crate) table: Arc<StateTable<P, Env>>,
    pub(crate) current: Option<StateId>,
    pub(crate) active: EventQueue<P>,
    pub(crate) deferred: EventQueue<P>,
    pub(crate) initialized: bool,
    pub(crate) sink: Arc<dyn DiagnosticSink>,
    pub(crate) history: TransitionLog,
}

impl<P, Env> Machine<P, Env> {
    /// Create an uninitialized machine.
    /// Returns an error if the configuration is invalid.
    pub fn new(table: Arc<StateTable<P, Env>>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::from_valid_config(table, config))
    }

    /// Create an uninitialized machine with the default configuration.
    pub fn with_defaults(table: Arc<StateTable<P, Env>>) -> Self {
        Self::from_valid_config(table, EngineConfig::default())
    }

    fn from_valid_config(table: Arc<StateTable<P, Env>>, config: EngineConfig) -> Self {
        Self {
            id: MachineId::new(),
            name: config.name,
            table,
            current: None,
            active: EventQueue::new(config.active_capacity),
            deferred: EventQueue::new(config.deferred_capacity),
            initialized: false,
            sink: Arc::new(TracingSink),
            history: TransitionLog::new(config.history_limit),
        }
    }

    /// Replace the diagnostics destination (defaults to [`TracingSink`]).
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Bind the initial state, empty both queues, and start accepting events.
    ///
    /// Calling `init` again restarts the machine: pending events and
    /// history are discarded. No enter action fires for the initial state.
    pub fn init(&mut self, initial: StateId) -> Result<(), EngineError> {
        self.check_state(initial)?;
        self.current = Some(initial);
        self.active.clear();
        self.deferred.clear();
        self.history.clear();
        self.initialized = true;
        info!(
            machine = self.label(),
            state = %self.state_label().unwrap_or_default(),
            "init"
        );
        Ok(())
    }

    /// Push an event onto the active queue.
    ///
    /// The event is dropped, reported to the sink, and an error returned if
    /// the machine is not initialized or the active queue is full.
    pub fn enqueue(&mut self, id: EventId, payload: P) -> Result<(), EngineError> {
        if !self.initialized {
            self.report(DiagnosticKind::NotInitialized, id, self.active.len());
            return Err(EngineError::NotInitialized {
                machine: self.label().to_string(),
            });
        }

        match self.active.enqueue(Event::new(id, payload)) {
            Ok(()) => {
                debug!(
                    machine = self.label(),
                    event = %id,
                    depth = self.active.len(),
                    "enqueue"
                );
                Ok(())
            }
            Err(full) => {
                self.report(
                    DiagnosticKind::QueueOverflow {
                        queue: QueueKind::Active,
                    },
                    id,
                    self.active.len(),
                );
                Err(EngineError::QueueOverflow {
                    queue: QueueKind::Active,
                    event: id,
                    capacity: full.capacity,
                })
            }
        }
    }

    /// Identity comparison with the current state.
    pub fn is_in_state(&self, state: StateId) -> bool {
        self.current == Some(state)
    }

    /// Set the current state directly, without guard, exit, or enter.
    ///
    /// Meant for test harnesses and bootstrapping. Does not initialize the
    /// machine or touch the queues.
    pub fn force_state(&mut self, state: StateId) -> Result<(), EngineError> {
        self.check_state(state)?;
        self.current = Some(state);
        debug!(
            machine = self.label(),
            state = %self.state_label().unwrap_or_default(),
            "forced state"
        );
        Ok(())
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn table(&self) -> &Arc<StateTable<P, Env>> {
        &self.table
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    /// Debug name of the current state.
    pub fn current_state_name(&self) -> Option<&str> {
        self.current_descriptor().and_then(|state| state.name())
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Ids waiting in the deferred queue, oldest first.
    pub fn pending_deferred(&self) -> Vec<EventId> {
        self.deferred.ids()
    }

    pub fn history(&self) -> &TransitionLog {
        &self.history
    }

    pub(crate) fn current_descriptor(&self) -> Option<&StateDescriptor<P, Env>> {
        self.current.and_then(|id| self.table.get(id))
    }

    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    pub(crate) fn state_label(&self) -> Option<String> {
        self.current_descriptor()
            .map(|state| state.label().into_owned())
    }

    pub(crate) fn queue(&self, kind: QueueKind) -> &EventQueue<P> {
        match kind {
            QueueKind::Active => &self.active,
            QueueKind::Deferred => &self.deferred,
        }
    }

    pub(crate) fn report(&self, kind: DiagnosticKind, event: EventId, queue_depth: usize) {
        self.sink.report(&Diagnostic {
            machine: self.id,
            machine_name: self.name.clone(),
            kind,
            event,
            queue_depth,
            state: self.state_label(),
            timestamp: Utc::now(),
        });
    }

    fn check_state(&self, state: StateId) -> Result<(), EngineError> {
        if self.table.contains(state) {
            Ok(())
        } else {
            Err(EngineError::UnknownState {
                index: state,
                states: self.table.len(),
            })
        }
    }
}

impl<P, Env> fmt::Debug for Machine<P, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("current", &self.current)
            .field("initialized", &self.initialized)
            .field("active", &self.active)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
