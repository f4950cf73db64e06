//! Events delivered to a state machine.
//!
//! An event is an identifier plus an opaque payload. The engine matches on
//! the identifier only; the payload is carried along untouched and handed
//! to state handlers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an event kind.
///
/// Event ids are small integers chosen by the adopting system, usually
/// declared as constants next to the state table.
///
/// # Example
///
/// ```rust
/// use deferflow::core::EventId;
///
/// const KEY_DOWN: EventId = EventId::new(1);
/// const KEY_UP: EventId = EventId::new(2);
///
/// assert_ne!(KEY_DOWN, KEY_UP);
/// assert_eq!(KEY_DOWN.raw(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u16);

impl EventId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for EventId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// An event waiting in, or taken from, a machine's queue.
///
/// The payload type is decided by the adopting system. The engine never
/// inspects it, so no bounds are placed on `P`.
#[derive(Clone, PartialEq, Debug)]
pub struct Event<P = ()> {
    pub id: EventId,
    pub payload: P,
}

impl<P> Event<P> {
    pub fn new(id: EventId, payload: P) -> Self {
        Self { id, payload }
    }
}

impl Event<()> {
    /// Create an event that carries no payload.
    pub fn bare(id: EventId) -> Self {
        Self { id, payload: () }
    }
}
