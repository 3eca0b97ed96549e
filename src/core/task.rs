//! Identity of an outstanding blockable-step timer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one blockable step of one session by position.
///
/// Keys are compared structurally, so `(1, 12)` and `(11, 2)` can never
/// collide the way concatenated strings could.
///
/// # Example
///
/// ```rust
/// use cookflow::core::TaskKey;
///
/// let key = TaskKey::new(0, 3);
/// assert_eq!(key.to_string(), "recipe 0 step 3");
/// assert_ne!(TaskKey::new(1, 12), TaskKey::new(11, 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    pub recipe_index: usize,
    pub step_index: usize,
}

impl TaskKey {
    pub fn new(recipe_index: usize, step_index: usize) -> Self {
        Self {
            recipe_index,
            step_index,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recipe {} step {}", self.recipe_index, self.step_index)
    }
}
