//! Handles to armed one-shot timers.

use crate::core::TaskKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Unique id of one armed timer, used to ignore firings that were superseded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// An armed timer.
///
/// Dropping the handle detaches the timer; call [`TimerHandle::cancel`] to
/// stop it from firing.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    key: TaskKey,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn new(id: TimerId, key: TaskKey, deadline: Instant, task: JoinHandle<()>) -> Self {
        Self {
            id,
            key,
            deadline,
            task,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn key(&self) -> TaskKey {
        self.key
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left until the timer fires, zero once the deadline has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the timer. Has no effect if it already fired.
    pub fn cancel(&self) {
        self.task.abort();
    }
}
