//! The cooking service: the entry point transports call into.
//!
//! [`CookingService`] owns the session registry, the shared timer scheduler,
//! the recipe store and the notifier for as long as the process runs. Client
//! operations and timer completions both go through the session's mutex, so
//! a completion can never interleave with a poll or start of the same
//! session.

pub mod error;

pub use error::ServiceError;

use crate::config::ServiceConfig;
use crate::core::TaskKey;
use crate::duration::parse_seconds;
use crate::notify::{self, Notifier};
use crate::scheduler::{BlockScheduler, TimerId};
use crate::session::{PollOutcome, SessionRegistry};
use crate::store::RecipeStore;
use std::sync::Arc;

/// Guides clients through their recipes and runs blockable-step timers.
///
/// Cloning is cheap; clones share the same sessions and timers.
#[derive(Clone)]
pub struct CookingService {
    inner: Arc<Inner>,
}

struct Inner {
    registry: SessionRegistry,
    scheduler: BlockScheduler,
    store: Arc<dyn RecipeStore>,
    notifier: Arc<dyn Notifier>,
}

impl CookingService {
    pub fn new(
        config: &ServiceConfig,
        store: Arc<dyn RecipeStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: SessionRegistry::new(),
                scheduler: BlockScheduler::new(&config.scheduler),
                store,
                notifier,
            }),
        }
    }

    /// Create (or replace) a session over the named dishes.
    ///
    /// Returns `false` and changes nothing if any dish is unknown.
    pub async fn create<S: AsRef<str>>(&self, session_id: &str, dish_names: &[S]) -> bool {
        let inner = &self.inner;
        match inner
            .registry
            .create(session_id, dish_names, inner.store.as_ref())
        {
            Ok(replaced) => {
                if let Some(previous) = replaced {
                    let cancelled = previous.lock().await.close();
                    tracing::info!(session = %session_id, cancelled, "Replaced existing session");
                }
                tracing::info!(session = %session_id, dishes = dish_names.len(), "Session created");
                true
            }
            Err(err) => {
                tracing::warn!(session = %session_id, error = %err, "Session not created");
                false
            }
        }
    }

    /// Ask for the next step. `None` if the session does not exist.
    ///
    /// Signals other than a step are also sent through the notifier; while
    /// timers are pending, every poll repeats their remaining-time notices.
    pub async fn poll_next(&self, session_id: &str) -> Option<PollOutcome> {
        let handle = self.inner.registry.get(session_id)?;
        let mut session = handle.lock().await;
        if session.is_closed() {
            return None;
        }

        let outcome = session.poll_next();
        let notifier = &self.inner.notifier;
        match &outcome {
            PollOutcome::Step(_) => {}
            PollOutcome::AwaitingStart(view) => {
                tracing::debug!(
                    session = %session_id,
                    dish = %view.dish_name,
                    step = view.step.step_number,
                    "Blockable step not started"
                );
                notifier.notify(session_id, notify::AWAITING_START);
            }
            PollOutcome::Pending(tasks) => {
                for task in tasks {
                    notifier.notify(
                        session_id,
                        &notify::pending_message(task.key, task.remaining_secs()),
                    );
                }
            }
            PollOutcome::AllDone => {
                tracing::info!(session = %session_id, "All dishes done");
                notifier.notify(session_id, notify::ALL_DONE);
            }
        }
        Some(outcome)
    }

    /// Start the wait of the blockable step under the cursor.
    ///
    /// On success the cursor moves on so other recipes can proceed, and the
    /// key of the armed timer is returned.
    pub async fn start_blockable(&self, session_id: &str) -> Result<TaskKey, ServiceError> {
        let not_found = || ServiceError::SessionNotFound(session_id.to_string());
        let handle = self.inner.registry.get(session_id).ok_or_else(not_found)?;
        let mut session = handle.lock().await;
        if session.is_closed() {
            return Err(not_found());
        }

        let request = session.start_request()?;
        let task = request.key;
        let seconds = parse_seconds(&request.duration)
            .map_err(|source| ServiceError::Duration { task, source })?;
        let delay = self.inner.scheduler.delay_for(seconds)?;

        let service = Arc::downgrade(&self.inner);
        let owner = session_id.to_string();
        let timer = self.inner.scheduler.schedule(task, delay, move |timer| async move {
            // The service may have been dropped while the timer slept.
            if let Some(inner) = service.upgrade() {
                inner.finish(&owner, task.recipe_index, Some(timer)).await;
            }
        })?;

        tracing::info!(
            session = %session_id,
            task = %task,
            timer = %timer.id(),
            wait_secs = seconds,
            "Blockable step started"
        );
        session.arm(timer);
        Ok(task)
    }

    /// Complete the current blockable step of `recipe_index` now.
    ///
    /// Timers call this path when they fire. Unknown sessions and recipes are
    /// ignored.
    pub async fn finish_blockable(&self, session_id: &str, recipe_index: usize) {
        self.inner.finish(session_id, recipe_index, None).await;
    }

    /// Drop a session and cancel its timers. Unknown ids are ignored.
    pub async fn unbind(&self, session_id: &str) {
        if let Some(handle) = self.inner.registry.remove(session_id) {
            let cancelled = handle.lock().await.close();
            tracing::info!(session = %session_id, cancelled, "Session unbound");
        }
    }

    /// Cancel every timer, drop every session and refuse new timers.
    pub async fn shutdown(&self) {
        self.inner.scheduler.shutdown();
        let mut cancelled = 0;
        for handle in self.inner.registry.drain() {
            cancelled += handle.lock().await.close();
        }
        tracing::info!(cancelled, "Cooking service shut down");
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.inner.registry.contains(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Timers armed across all sessions and not yet finished.
    pub fn outstanding_timers(&self) -> usize {
        self.inner.scheduler.outstanding()
    }
}

impl Inner {
    async fn finish(&self, session_id: &str, recipe_index: usize, timer: Option<TimerId>) {
        let Some(handle) = self.registry.get(session_id) else {
            tracing::debug!(session = %session_id, recipe = recipe_index, "Completion for unknown session");
            return;
        };
        let mut session = handle.lock().await;
        let Some(view) = session.complete(recipe_index, timer) else {
            return;
        };

        tracing::info!(
            session = %session_id,
            dish = %view.dish_name,
            step = view.step.step_number,
            "Blockable step finished"
        );
        self.notifier
            .notify(session_id, &notify::block_finished_message(&view.to_json()));
    }
}

