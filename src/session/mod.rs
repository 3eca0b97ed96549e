//! Cooking sessions: state, traversal and the registry that owns them.
//!
//! A [`Session`] records which step of each selected recipe a client is on
//! and which blockable steps have timers. [`Session::poll_next`],
//! [`Session::start_request`]/[`Session::arm`] and [`Session::complete`] form
//! the state machine; [`SessionRegistry`] maps session ids to lockable
//! sessions.

pub mod error;
mod machine;
mod registry;
mod state;

pub use error::SessionError;
pub use machine::{PendingTask, PollOutcome, StartRequest};
pub use registry::{SessionHandle, SessionRegistry};
pub use state::{Session, TaskEntry};
