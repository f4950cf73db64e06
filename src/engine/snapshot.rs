//! Point-in-time view of a machine for debugging dumps.
//!
//! Snapshots capture ids and labels only. Payloads and handlers are not
//! serialized and there is no way to rebuild a machine from a snapshot.

use crate::core::{EventId, StateId, TransitionLog};
use crate::engine::error::EngineError;
use crate::engine::machine::{Machine, MachineId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serializable view of a [`Machine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub id: MachineId,
    pub name: Option<String>,
    pub initialized: bool,
    pub state: Option<StateId>,
    pub state_name: Option<String>,

    /// Pending active event ids, oldest first
    pub active: Vec<EventId>,
    pub active_capacity: usize,

    /// Pending deferred event ids, oldest first
    pub deferred: Vec<EventId>,
    pub deferred_capacity: usize,

    pub history: TransitionLog,
    pub taken_at: DateTime<Utc>,
}

impl MachineSnapshot {
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

impl<P, Env> Machine<P, Env> {
    /// Capture the current state, queue contents, and history.
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            id: self.id,
            name: self.name.clone(),
            initialized: self.initialized,
            state: self.current,
            state_name: self.state_label(),
            active: self.active.ids(),
            active_capacity: self.active.capacity(),
            deferred: self.deferred.ids(),
            deferred_capacity: self.deferred.capacity(),
            history: self.history.clone(),
            taken_at: Utc::now(),
        }
    }
}
