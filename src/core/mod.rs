//! Core state machine types.
//!
//! This module contains the static side of a machine:
//! - Events and their identifiers
//! - The `StateHandler` capability every state provides
//! - State descriptors and the index-based `StateTable` that holds them
//! - Bounded transition history
//!
//! Nothing here owns runtime state; see [`crate::engine`] for that.

mod descriptor;
mod event;
mod handler;
mod history;
mod table;

pub use descriptor::{StateDescriptor, StateId, TransitionEdge};
pub use event::{Event, EventId};
pub use handler::{FnHandler, NoopHandler, StateHandler};
pub use history::{TransitionKind, TransitionLog, TransitionRecord};
pub use table::StateTable;
