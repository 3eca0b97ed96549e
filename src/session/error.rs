//! Session error types.

use crate::core::TaskKey;
use thiserror::Error;

/// Errors raised by session operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// The caller asked for an operation the session cannot perform now
    #[error("Invalid session state: {reason}")]
    InvalidState { reason: String },

    /// A blockable step carries no duration to wait for
    #[error("Blockable step at {task} has no duration")]
    MissingDuration { task: TaskKey },

    /// A dish name did not resolve in the recipe store
    #[error("No such dish: '{0}'")]
    UnknownDish(String),
}

impl SessionError {
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}
