//! State management with actor pattern
//!
//! StateManager owns the SQLite Store and processes messages via channels,
//! providing thread-safe access to persistent state.

mod manager;
mod messages;
mod store;

pub use manager::StateManager;
pub use messages::{AssignmentFilter, NewAssignmentRecord, StateCommand, StateError, StateResponse};
pub use store::Store;
