//! Builder API for ergonomic state table construction.
//!
//! Tables are assembled in two steps: declare every state (receiving its
//! [`StateId`](crate::core::StateId)), then wire edges and deferrals
//! between them. The [`transitions!`](crate::transitions) macro covers the
//! second step for larger tables.

pub mod error;
pub mod macros;
pub mod table;

pub use error::BuildError;
pub use table::StateTableBuilder;
