//! Core cooking-session types and traversal logic.
//!
//! This module contains the pure core of the session state machine:
//! - Recipe and step definitions and their flat wire format
//! - Structural task keys for blockable-step timers
//! - Cursor bookkeeping that plans the next step without side effects
//!
//! Nothing here touches timers, locks or notifiers; the session and service
//! layers apply these plans.

mod progress;
mod recipe;
mod task;

pub use progress::{Advance, Position, Progress, Scan, TaskGate};
pub use recipe::{Recipe, Step, StepView, TimeRequirement};
pub use task::TaskKey;
