//! Cookflow: guided traversal of cooking sessions with timed steps
//!
//! A client picks a few dishes and asks for steps one at a time. Steps that
//! only need waiting (simmer, rest, bake) are *blockable*: once started they
//! run on a shared timer while the client moves on to the other dishes, and
//! when the wait is over the session refocuses on the finished dish.
//!
//! # Core Concepts
//!
//! - **Progress**: Pure traversal planning over per-recipe step indices
//! - **Session**: One client's recipes, cursor and timer bookkeeping
//! - **Scheduler**: Bounded one-shot timers on the tokio runtime
//! - **Service**: The surface transports call into
//!
//! # Example
//!
//! ```rust
//! use cookflow::core::{Recipe, Step};
//! use cookflow::notify::LogNotifier;
//! use cookflow::session::PollOutcome;
//! use cookflow::store::InMemoryRecipeStore;
//! use cookflow::{CookingService, ServiceConfig};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = InMemoryRecipeStore::from_recipes(vec![Recipe::new(
//!     "Rice",
//!     vec![Step::normal(1, "Rinse the rice"), Step::blockable(2, "Soak", "20 min")],
//! )])
//! .unwrap();
//! let service = CookingService::new(
//!     &ServiceConfig::default(),
//!     Arc::new(store),
//!     Arc::new(LogNotifier),
//! );
//!
//! assert!(service.create("kitchen-1", &["Rice"]).await);
//! let outcome = service.poll_next("kitchen-1").await.unwrap();
//! assert_eq!(outcome.step().unwrap().step.description, "Rinse the rice");
//! # }
//! ```

pub mod config;
pub mod core;
pub mod duration;
pub mod logging;
pub mod notify;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use core::{Recipe, Step, StepView, TaskKey};
pub use notify::Notifier;
pub use service::{CookingService, ServiceError};
pub use session::PollOutcome;
pub use store::RecipeStore;
