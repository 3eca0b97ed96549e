//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur when arming a timer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchedulerError {
    /// Every timer slot is in use
    #[error("Timer capacity exhausted ({capacity} outstanding timers)")]
    Exhausted { capacity: usize },

    /// The scheduler no longer accepts timers
    #[error("Scheduler has been shut down")]
    ShutDown,

    /// The wait cannot be represented as a deadline on this clock
    #[error("Delay of {seconds} seconds is out of range")]
    DelayOutOfRange { seconds: u64 },

    /// Called outside of a tokio runtime
    #[error("No async runtime available to run timers")]
    NoRuntime,
}
