//! Build errors for state tables.

use crate::core::{EventId, StateId};
use thiserror::Error;

/// Errors that can occur when building a state table.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("No states declared. Call .state(name, handler) before .build()")]
    NoStates,

    #[error("State {index} is not part of this table ({states} states declared)")]
    UnknownState { index: StateId, states: usize },

    #[error("State '{state}' declares the edge {trigger} -> {target} more than once")]
    DuplicateEdge {
        state: String,
        trigger: EventId,
        target: StateId,
    },
}
