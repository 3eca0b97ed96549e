//! Per-session mutable state.

use crate::core::{Progress, Recipe, TaskGate, TaskKey};
use crate::scheduler::TimerHandle;
use std::collections::HashMap;
use std::sync::Arc;

/// Timer bookkeeping for one blockable step.
#[derive(Debug)]
pub enum TaskEntry {
    /// Timer armed and not yet completed
    Armed(TimerHandle),
    /// Timer completed; removed once a poll moves the recipe past the step,
    /// kept for good when it was the recipe's last step
    Fired,
}

impl TaskEntry {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed(_))
    }
}

/// One client's traversal of a fixed list of recipes.
#[derive(Debug)]
pub struct Session {
    pub(crate) id: String,
    pub(crate) recipes: Vec<Arc<Recipe>>,
    pub(crate) progress: Progress,
    pub(crate) tasks: HashMap<TaskKey, TaskEntry>,
    pub(crate) closed: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, recipes: Vec<Arc<Recipe>>) -> Self {
        let progress = Progress::new(recipes.len());
        Self {
            id: id.into(),
            recipes,
            progress,
            tasks: HashMap::new(),
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn recipes(&self) -> &[Arc<Recipe>] {
        &self.recipes
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Timer status of a task key as the traversal planner sees it.
    pub fn gate(&self, key: TaskKey) -> TaskGate {
        task_gate(&self.tasks, key)
    }

    pub fn live_timer_count(&self) -> usize {
        self.tasks.values().filter(|entry| entry.is_armed()).count()
    }

    /// Cancel every armed timer and refuse further work.
    pub fn close(&mut self) -> usize {
        let mut cancelled = 0;
        for entry in self.tasks.values() {
            if let TaskEntry::Armed(handle) = entry {
                handle.cancel();
                cancelled += 1;
            }
        }
        self.tasks.clear();
        self.closed = true;
        cancelled
    }
}

pub(crate) fn task_gate(tasks: &HashMap<TaskKey, TaskEntry>, key: TaskKey) -> TaskGate {
    match tasks.get(&key) {
        None => TaskGate::NotStarted,
        Some(TaskEntry::Armed(_)) => TaskGate::Running,
        Some(TaskEntry::Fired) => TaskGate::Fired,
    }
}
