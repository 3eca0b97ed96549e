//! Recipe store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when building a recipe catalog
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read recipe catalog {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse recipe catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Dish '{0}' is defined more than once")]
    DuplicateDish(String),

    #[error("Recipe has an empty dish name")]
    EmptyDishName,
}
