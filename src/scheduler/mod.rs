//! One-shot timers for blockable steps.
//!
//! A single [`BlockScheduler`] serves every session. Each armed timer runs on
//! its own tokio task, so arming and firing never block the caller, and holds
//! a permit from a shared semaphore that bounds how many timers can be
//! outstanding at once.

pub mod error;
mod timer;

pub use error::SchedulerError;
pub use timer::{TimerHandle, TimerId};

use crate::config::SchedulerConfig;
use crate::core::TaskKey;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::time::Instant;

/// Shared timer facility.
#[derive(Debug)]
pub struct BlockScheduler {
    permits: Arc<Semaphore>,
    capacity: usize,
    time_scale: f64,
    next_id: AtomicU64,
}

impl BlockScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.max_outstanding_timers)),
            capacity: config.max_outstanding_timers,
            time_scale: config.time_scale,
            next_id: AtomicU64::new(1),
        }
    }

    /// Wall-clock delay for a wait of `seconds` parsed seconds.
    pub fn delay_for(&self, seconds: u64) -> Result<Duration, SchedulerError> {
        Duration::try_from_secs_f64(seconds as f64 * self.time_scale)
            .map_err(|_| SchedulerError::DelayOutOfRange { seconds })
    }

    /// Arm a one-shot timer that runs `callback` after `delay`.
    ///
    /// The callback receives the new timer's id so completion handlers can
    /// tell a current timer from one that was replaced.
    pub fn schedule<C, F>(
        &self,
        key: TaskKey,
        delay: Duration,
        callback: C,
    ) -> Result<TimerHandle, SchedulerError>
    where
        C: FnOnce(TimerId) -> F,
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let deadline = Instant::now()
            .checked_add(delay)
            .ok_or(SchedulerError::DelayOutOfRange {
                seconds: delay.as_secs(),
            })?;
        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|err| match err {
                TryAcquireError::Closed => SchedulerError::ShutDown,
                TryAcquireError::NoPermits => SchedulerError::Exhausted {
                    capacity: self.capacity,
                },
            })?;

        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let fire = callback(id);

        let task = runtime.spawn(async move {
            let _permit = permit;
            tokio::time::sleep_until(deadline).await;
            tracing::debug!(timer = %id, task = %key, "Timer fired");
            fire.await;
        });

        tracing::debug!(timer = %id, task = %key, delay_ms = delay.as_millis() as u64, "Timer armed");
        Ok(TimerHandle::new(id, key, deadline, task))
    }

    /// Number of timers armed and not yet finished.
    pub fn outstanding(&self) -> usize {
        if self.permits.is_closed() {
            return 0;
        }
        self.capacity - self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Refuse further timers. Already armed timers are cancelled by their
    /// owners.
    pub fn shutdown(&self) {
        self.permits.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }
}
