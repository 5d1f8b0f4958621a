//! Session information queries

use crate::manager::clock::Clock;
use crate::manager::session::SessionInfo;
use crate::transport::ChannelTransport;
use crate::types::ConversationId;

use super::core::SessionManager;

impl<T: ChannelTransport, C: Clock> SessionManager<T, C> {
    /// Number of conversations currently tracked
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Snapshot of one conversation
    ///
    /// Waits for an in-flight turn on that conversation to finish.
    pub async fn session_info(&self, conversation_id: &ConversationId) -> Option<SessionInfo> {
        let handle = self.store.get(conversation_id)?;
        let session = handle.lock().await;
        (!session.retired).then(|| session.info())
    }
}
