//! Concurrent session registry.

use super::error::SessionError;
use super::state::Session;
use crate::store::RecipeStore;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, lockable session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Owns every live session, keyed by session id.
///
/// The map is sharded, and each session has its own async mutex, so
/// unrelated sessions never contend. Map guards are released before a handle
/// is returned; callers lock the session afterwards.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every dish and insert a fresh session under `session_id`.
    ///
    /// Nothing is inserted if any dish is unknown. Returns the session that
    /// was replaced, if one existed.
    pub fn create<S: AsRef<str>>(
        &self,
        session_id: &str,
        dish_names: &[S],
        store: &dyn RecipeStore,
    ) -> Result<Option<SessionHandle>, SessionError> {
        let recipes = dish_names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                store
                    .find_by_name(name)
                    .ok_or_else(|| SessionError::UnknownDish(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let session = Session::new(session_id, recipes);
        Ok(self
            .sessions
            .insert(session_id.to_string(), Arc::new(Mutex::new(session))))
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a session. Absent ids are not an error.
    pub fn remove(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.remove(session_id).map(|(_, handle)| handle)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove and return every session.
    pub fn drain(&self) -> Vec<SessionHandle> {
        let ids: Vec<String> = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }
}
