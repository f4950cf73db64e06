//! Engine error types.

use crate::config::{ConfigError, QueueKind};
use crate::core::{EventId, StateId};
use thiserror::Error;

/// Errors returned by machine operations.
///
/// None of these leave the machine in a broken state: the offending event
/// (if any) is dropped and the machine keeps running.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Machine '{machine}' is not initialized. Call .init(state) first")]
    NotInitialized { machine: String },

    #[error("The {queue} queue is full (capacity {capacity}), dropped {event}")]
    QueueOverflow {
        queue: QueueKind,
        event: EventId,
        capacity: usize,
    },

    #[error("State {index} is not part of this machine's table ({states} states)")]
    UnknownState { index: StateId, states: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
