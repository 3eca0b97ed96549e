//! Read-only recipe lookup.
//!
//! Sessions resolve dish names through a [`RecipeStore`] once, at creation.
//! [`InMemoryRecipeStore`] keeps a catalog in memory and can load it from a
//! JSON file shaped like `[{ "dishName": "...", "steps": [...] }]`.

pub mod error;

pub use error::StoreError;

use crate::core::Recipe;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Lookup of recipe definitions by dish name.
pub trait RecipeStore: Send + Sync {
    fn find_by_name(&self, name: &str) -> Option<Arc<Recipe>>;
}

/// Recipe catalog held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecipeStore {
    recipes: HashMap<String, Arc<Recipe>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from recipes, rejecting duplicate or empty dish names.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for recipe in recipes {
            store.insert(recipe)?;
        }
        Ok(store)
    }

    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        let recipes: Vec<Recipe> = serde_json::from_str(content)?;
        Self::from_recipes(recipes)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&content)?;
        tracing::info!(path = ?path, recipes = store.len(), "Loaded recipe catalog");
        Ok(store)
    }

    pub fn insert(&mut self, recipe: Recipe) -> Result<(), StoreError> {
        if recipe.dish_name.trim().is_empty() {
            return Err(StoreError::EmptyDishName);
        }
        if self.recipes.contains_key(&recipe.dish_name) {
            return Err(StoreError::DuplicateDish(recipe.dish_name));
        }
        self.recipes
            .insert(recipe.dish_name.clone(), Arc::new(recipe));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Dish names in alphabetical order.
    pub fn dish_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl RecipeStore for InMemoryRecipeStore {
    fn find_by_name(&self, name: &str) -> Option<Arc<Recipe>> {
        self.recipes.get(name).cloned()
    }
}
