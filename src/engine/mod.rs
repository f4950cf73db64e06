//! Runtime machines: event queues, dispatch, and snapshots.

mod dispatch;
mod error;
mod machine;
mod queue;
mod snapshot;

pub use dispatch::DispatchReport;
pub use error::EngineError;
pub use machine::{Machine, MachineId};
pub use queue::{EventQueue, QueueFull};
pub use snapshot::MachineSnapshot;
