//! Traversal cursor over a session's recipes.
//!
//! `Progress` is pure bookkeeping: it plans where the next step is without
//! touching timers or notifiers, and only changes when a plan is applied.

use super::recipe::Recipe;
use super::task::TaskKey;
use std::sync::Arc;

/// A (recipe, step) coordinate inside a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub recipe_index: usize,
    pub step_index: usize,
}

impl Position {
    pub fn new(recipe_index: usize, step_index: usize) -> Self {
        Self {
            recipe_index,
            step_index,
        }
    }

    pub fn task_key(&self) -> TaskKey {
        TaskKey::new(self.recipe_index, self.step_index)
    }
}

/// Timer status of a blockable step, as seen by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskGate {
    /// No timer was ever armed for the step.
    NotStarted,
    /// A timer is armed and has not fired.
    Running,
    /// The timer fired; the step no longer blocks.
    Fired,
}

/// Where the next poll lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A step to serve; the cursor moves onto it.
    Step(Position),
    /// A served blockable step that must be started before moving on.
    Gated(Position),
    /// Nothing reachable right now.
    Exhausted,
}

/// Result of planning a poll: the landing spot plus the fired entry the
/// landing step moves past, which the caller clears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scan {
    pub advance: Advance,
    pub consumed: Vec<TaskKey>,
}

/// Per-session traversal state.
///
/// `None` step indices mean the recipe has not started. The cursor equals the
/// recipe count once every recipe has been left behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    step_indices: Vec<Option<usize>>,
    cursor: usize,
}

impl Progress {
    pub fn new(recipe_count: usize) -> Self {
        Self {
            step_indices: vec![None; recipe_count],
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn recipe_count(&self) -> usize {
        self.step_indices.len()
    }

    pub fn step_index(&self, recipe_index: usize) -> Option<usize> {
        self.step_indices.get(recipe_index).copied().flatten()
    }

    /// The step the cursor points at, if the cursor's recipe has started.
    pub fn current(&self) -> Option<Position> {
        self.step_index(self.cursor)
            .map(|step_index| Position::new(self.cursor, step_index))
    }

    /// Find the next landing spot without mutating anything.
    ///
    /// Recipes are scanned from the cursor to the end, then from the start up
    /// to the cursor so recipes left behind by a timer get resumed. A recipe
    /// whose current step is blockable stops the scan when that step was never
    /// started and is skipped while its timer runs.
    pub fn plan<G>(&self, recipes: &[Arc<Recipe>], gate: G) -> Scan
    where
        G: Fn(TaskKey) -> TaskGate,
    {
        let count = self.recipe_count().min(recipes.len());
        let mut consumed = Vec::new();
        let order = (self.cursor..count).chain(0..self.cursor.min(count));

        for recipe_index in order {
            let recipe = &recipes[recipe_index];
            let current = self.step_indices[recipe_index];

            let mut fired = None;
            if let Some(step_index) = current {
                let blockable = recipe
                    .step(step_index)
                    .is_some_and(|step| step.is_blockable);
                if blockable {
                    let key = TaskKey::new(recipe_index, step_index);
                    match gate(key) {
                        TaskGate::NotStarted => {
                            return Scan {
                                advance: Advance::Gated(Position::new(recipe_index, step_index)),
                                consumed,
                            };
                        }
                        TaskGate::Running => continue,
                        TaskGate::Fired => fired = Some(key),
                    }
                }
            }

            let next = current.map_or(0, |step_index| step_index + 1);
            if next < recipe.step_count() {
                // A fired last step is never consumed; its entry marks the
                // recipe as finished.
                consumed.extend(fired);
                return Scan {
                    advance: Advance::Step(Position::new(recipe_index, next)),
                    consumed,
                };
            }
        }

        Scan {
            advance: Advance::Exhausted,
            consumed,
        }
    }

    /// Move onto a planned landing spot.
    pub fn apply(&mut self, advance: Advance) {
        match advance {
            Advance::Step(position) => {
                debug_assert!(self
                    .step_index(position.recipe_index)
                    .map_or(true, |current| current < position.step_index));
                self.step_indices[position.recipe_index] = Some(position.step_index);
                self.cursor = position.recipe_index;
            }
            Advance::Gated(position) => {
                self.cursor = position.recipe_index;
            }
            Advance::Exhausted => {}
        }
    }

    /// Let the cursor move past the current recipe while it waits.
    pub fn release(&mut self) {
        self.cursor = (self.cursor + 1).min(self.recipe_count());
    }

    /// Point the cursor back at a recipe whose wait completed.
    pub fn focus(&mut self, recipe_index: usize) -> bool {
        if recipe_index >= self.recipe_count() {
            return false;
        }
        self.cursor = recipe_index;
        true
    }
}
