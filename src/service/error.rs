//! Service-level error types.

use crate::core::TaskKey;
use crate::duration::DurationError;
use crate::scheduler::SchedulerError;
use crate::session::SessionError;
use thiserror::Error;

/// Errors reported to callers of the cooking service
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid duration for {task}: {source}")]
    Duration {
        task: TaskKey,
        #[source]
        source: DurationError,
    },

    #[error("Failed to schedule timer: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl ServiceError {
    /// True for caller sequencing errors, such as starting a normal step.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::Session(SessionError::InvalidState { .. }))
    }
}
