//! The step-traversal state machine.
//!
//! Operations run on a `&mut Session` that the caller has already locked, so
//! every poll, start and completion of one session is serialized. Timer arming
//! and notices are left to the service layer.

use super::error::SessionError;
use super::state::{task_gate, Session, TaskEntry};
use crate::core::{Advance, Position, StepView, TaskKey};
use crate::scheduler::{TimerHandle, TimerId};
use std::time::Duration;

/// A live timer reported while polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTask {
    pub key: TaskKey,
    pub remaining: Duration,
}

impl PendingTask {
    /// Remaining time rounded up to whole seconds.
    pub fn remaining_secs(&self) -> u64 {
        let secs = self.remaining.as_secs();
        if self.remaining.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Result of asking for the next step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The next step; the cursor now points at it
    Step(StepView),
    /// A served blockable step must be started before traversal continues
    AwaitingStart(StepView),
    /// Nothing to do until a running timer completes
    Pending(Vec<PendingTask>),
    /// Every step served and no timer running
    AllDone,
}

impl PollOutcome {
    pub fn step(&self) -> Option<&StepView> {
        match self {
            Self::Step(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_all_done(&self) -> bool {
        matches!(self, Self::AllDone)
    }
}

/// A blockable step that passed validation and can be armed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartRequest {
    pub key: TaskKey,
    pub duration: String,
}

impl Session {
    /// Advance to the next step or report why traversal cannot move.
    pub fn poll_next(&mut self) -> PollOutcome {
        let tasks = &self.tasks;
        let scan = self
            .progress
            .plan(&self.recipes, |key| task_gate(tasks, key));

        for key in &scan.consumed {
            tracing::debug!(session = %self.id, task = %key, "Clearing completed task");
            self.tasks.remove(key);
        }

        self.progress.apply(scan.advance);
        match scan.advance {
            Advance::Step(position) => {
                tracing::debug!(
                    session = %self.id,
                    recipe = position.recipe_index,
                    step = position.step_index,
                    "Serving step"
                );
                PollOutcome::Step(self.view(position))
            }
            Advance::Gated(position) => PollOutcome::AwaitingStart(self.view(position)),
            Advance::Exhausted => {
                let mut pending: Vec<PendingTask> = self
                    .tasks
                    .iter()
                    .filter_map(|(key, entry)| match entry {
                        TaskEntry::Armed(handle) => Some(PendingTask {
                            key: *key,
                            remaining: handle.remaining(),
                        }),
                        TaskEntry::Fired => None,
                    })
                    .collect();
                if pending.is_empty() {
                    PollOutcome::AllDone
                } else {
                    pending.sort_by_key(|task| task.key);
                    PollOutcome::Pending(pending)
                }
            }
        }
    }

    /// Check that the step under the cursor can be started.
    pub fn start_request(&self) -> Result<StartRequest, SessionError> {
        if self.closed {
            return Err(SessionError::invalid_state("session is closed"));
        }
        let position = self
            .progress
            .current()
            .ok_or_else(|| SessionError::invalid_state("no step under the cursor"))?;
        let step = self.recipes[position.recipe_index]
            .step(position.step_index)
            .ok_or_else(|| SessionError::invalid_state("cursor points past the recipe"))?;
        if !step.is_blockable {
            return Err(SessionError::invalid_state(format!(
                "step {} of '{}' is not blockable",
                step.step_number, self.recipes[position.recipe_index].dish_name
            )));
        }

        let key = position.task_key();
        match self.tasks.get(&key) {
            Some(TaskEntry::Armed(_)) => {
                return Err(SessionError::invalid_state(format!("{key} already started")))
            }
            Some(TaskEntry::Fired) => {
                return Err(SessionError::invalid_state(format!("{key} already finished")))
            }
            None => {}
        }

        let duration = step
            .duration()
            .ok_or(SessionError::MissingDuration { task: key })?;
        Ok(StartRequest {
            key,
            duration: duration.to_string(),
        })
    }

    /// Record an armed timer and let other recipes proceed.
    pub fn arm(&mut self, handle: TimerHandle) {
        let key = handle.key();
        if let Some(TaskEntry::Armed(previous)) = self.tasks.insert(key, TaskEntry::Armed(handle)) {
            previous.cancel();
        }
        self.progress.release();
    }

    /// Mark the current step of `recipe_index` as waited out and focus on it.
    ///
    /// With `timer` set, only that timer may complete the step; a stale firing
    /// from a replaced or cancelled timer returns `None`. Without it, an armed
    /// timer for the step is cancelled. A step that already completed is not
    /// completed again.
    pub fn complete(&mut self, recipe_index: usize, timer: Option<TimerId>) -> Option<StepView> {
        if self.closed {
            return None;
        }
        let step_index = self.progress.step_index(recipe_index)?;
        let position = Position::new(recipe_index, step_index);
        let key = position.task_key();

        match (self.tasks.get(&key), timer) {
            (Some(TaskEntry::Armed(handle)), Some(id)) if handle.id() == id => {}
            (_, Some(id)) => {
                tracing::debug!(session = %self.id, task = %key, timer = %id, "Ignoring stale timer");
                return None;
            }
            (Some(TaskEntry::Armed(handle)), None) => handle.cancel(),
            (Some(TaskEntry::Fired), None) => return None,
            (None, None) => {}
        }

        let step = self.recipes[recipe_index].step(step_index)?;
        if step.is_blockable {
            self.tasks.insert(key, TaskEntry::Fired);
        }
        self.progress.focus(recipe_index);
        Some(self.view(position))
    }

    fn view(&self, position: Position) -> StepView {
        let recipe = &self.recipes[position.recipe_index];
        StepView::new(recipe, &recipe.steps[position.step_index])
    }
}
