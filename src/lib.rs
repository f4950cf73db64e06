//! Deferflow: an event-driven state machine engine with deferred events
//!
//! Deferflow runs flat finite state machines described by a static, shared
//! [`StateTable`]. Each [`Machine`] owns two bounded queues: events are
//! enqueued on the active queue, and events the current state cannot use
//! yet but is allowed to hold are parked on the deferred queue and replayed
//! after a later state change.
//!
//! # Core Concepts
//!
//! - **Edges**: ordered `(trigger, target)` pairs per state. Several edges
//!   may share a trigger; the target's guard picks among them.
//! - **Handlers**: per-state `guard`, `enter`, `exit`, and `internal`
//!   actions via the [`StateHandler`] trait, all with a caller-supplied
//!   environment.
//! - **Deferral**: a per-state whitelist of events held for replay.
//! - **Diagnostics**: dropped or rejected events are reported to an
//!   injected [`DiagnosticSink`](diagnostics::DiagnosticSink).
//!
//! # Example
//!
//! ```rust
//! use deferflow::{EngineConfig, Event, EventId, FnHandler, Machine, NoopHandler, StateTableBuilder};
//! use std::sync::Arc;
//!
//! const COIN: EventId = EventId::new(1);
//! const PUSH: EventId = EventId::new(2);
//!
//! #[derive(Default)]
//! struct Turnstile {
//!     coins: u32,
//! }
//!
//! let mut builder = StateTableBuilder::<(), Turnstile>::new();
//! let locked = builder.state("Locked", NoopHandler);
//! let unlocked = builder.state(
//!     "Unlocked",
//!     FnHandler::new().on_enter(|_: &Event, env: &mut Turnstile| env.coins += 1),
//! );
//! builder
//!     .transition(locked, COIN, unlocked)
//!     .transition(unlocked, PUSH, locked)
//!     .defer(locked, PUSH);
//!
//! let config = EngineConfig::builder().name("turnstile").capacity(8).build().unwrap();
//! let mut machine = Machine::new(Arc::new(builder.build().unwrap()), config).unwrap();
//! machine.init(locked).unwrap();
//!
//! // PUSH arrives first and waits for the coin.
//! machine.enqueue(PUSH, ()).unwrap();
//! machine.enqueue(COIN, ()).unwrap();
//!
//! let mut env = Turnstile::default();
//! let report = machine.process_events(&mut env).unwrap();
//!
//! assert!(machine.is_in_state(locked));
//! assert_eq!(env.coins, 1);
//! assert_eq!(report.consumed_deferred, 1);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod engine;

// Re-export commonly used types
pub use builder::{BuildError, StateTableBuilder};
pub use config::{ConfigBuilder, ConfigError, EngineConfig, QueueKind};
pub use core::{
    Event, EventId, FnHandler, NoopHandler, StateHandler, StateId, StateTable, TransitionKind,
    TransitionLog, TransitionRecord,
};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, NullSink, TracingSink};
pub use engine::{DispatchReport, EngineError, Machine, MachineId, MachineSnapshot};
