//! Keyed session store
//!
//! Maps conversation ids to sessions. The map itself sits behind a short-lived
//! `parking_lot` lock; each session carries its own async mutex that a turn
//! holds for its whole post/poll cycle.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::session::ConversationSession;
use crate::types::ConversationId;

/// Shared handle to one session
pub(super) type SessionHandle = Arc<AsyncMutex<ConversationSession>>;

/// Exclusive access to one session for the duration of a turn
pub(super) type SessionGuard = OwnedMutexGuard<ConversationSession>;

#[derive(Default)]
pub(super) struct SessionStore {
    sessions: Mutex<HashMap<ConversationId, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, conversation_id: &ConversationId) -> Option<SessionHandle> {
        self.sessions.lock().get(conversation_id).cloned()
    }

    /// Register a new session and return it already locked
    ///
    /// The guard is taken before the session becomes visible, so no other
    /// turn can slip in between creation and first use.
    pub async fn insert_locked(&self, session: ConversationSession) -> SessionGuard {
        let conversation_id = session.conversation_id.clone();
        let handle = Arc::new(AsyncMutex::new(session));
        let guard = Arc::clone(&handle).lock_owned().await;

        if self.sessions.lock().insert(conversation_id.clone(), handle).is_some() {
            log::warn!("Replacing existing session for conversation {conversation_id}");
        }
        guard
    }

    /// Forget a session
    pub fn remove(&self, conversation_id: &ConversationId) -> Option<SessionHandle> {
        self.sessions.lock().remove(conversation_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn ids(&self) -> Vec<ConversationId> {
        self.sessions.lock().keys().cloned().collect()
    }

    pub fn clear(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let count = sessions.len();
        sessions.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn inserted_session_is_locked_until_guard_drops() {
        let store = SessionStore::new();
        let id = ConversationId::from("c1");
        let guard = store
            .insert_locked(ConversationSession::new("HR", id.clone(), Utc::now()))
            .await;

        let handle = store.get(&id).unwrap();
        assert!(handle.try_lock().is_err());
        drop(guard);
        assert!(handle.try_lock().is_ok());
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let store = SessionStore::new();
        for id in ["a", "b", "c"] {
            drop(
                store
                    .insert_locked(ConversationSession::new("HR", id.into(), Utc::now()))
                    .await,
            );
        }
        assert_eq!(store.len(), 3);
        assert!(store.remove(&ConversationId::from("b")).is_some());
        assert!(store.remove(&ConversationId::from("b")).is_none());
        assert_eq!(store.clear(), 2);
        assert_eq!(store.len(), 0);
    }
}
