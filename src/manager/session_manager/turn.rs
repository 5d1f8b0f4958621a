//! Query turns
//!
//! Resolves the agent and session, posts the query (restarting an expired
//! conversation once) and hands over to the poll loop.

use chrono::{DateTime, Utc};

use crate::error::{AgentError, Result};
use crate::manager::clock::Clock;
use crate::manager::options::TurnOptions;
use crate::manager::session::ConversationSession;
use crate::manager::store::SessionGuard;
use crate::transport::ChannelTransport;
use crate::types::{ActivityId, AgentDefinition, ConversationId, TurnOutcome};

use super::core::{SessionManager, TurnBudget};

impl<T: ChannelTransport, C: Clock> SessionManager<T, C> {
    /// Send `query` to `agent_name` and wait for its reply using the default options
    ///
    /// See [`SessionManager::send_and_wait_with`].
    pub async fn send_and_wait(
        &self,
        agent_name: &str,
        query: &str,
        conversation_id: Option<&ConversationId>,
    ) -> TurnOutcome {
        let options = self.defaults.clone();
        self.send_and_wait_with(agent_name, query, conversation_id, &options)
            .await
    }

    /// Send `query` to `agent_name` and wait for its reply
    ///
    /// Continues `conversation_id` when this manager knows it for the same
    /// agent; otherwise starts a new conversation. Every failure is reported
    /// in the returned outcome.
    pub async fn send_and_wait_with(
        &self,
        agent_name: &str,
        query: &str,
        conversation_id: Option<&ConversationId>,
        options: &TurnOptions,
    ) -> TurnOutcome {
        let agent = match self.catalog.get(agent_name) {
            Ok(agent) => agent,
            Err(e) => {
                log::warn!("Rejecting query: {e}");
                return TurnOutcome::failure(&e, None, None);
            }
        };

        let budget = TurnBudget::start(&self.clock, options.timeout);

        let (mut session, reused) = match self.acquire_session(agent, conversation_id, &budget).await {
            Ok(acquired) => acquired,
            Err(e) => {
                log::warn!("Agent '{}': could not open conversation: {e}", agent.name);
                return TurnOutcome::failure(&e, conversation_id.cloned(), None);
            }
        };

        let result = self
            .run_turn(agent, &mut session, reused, query, options, &budget)
            .await;

        match result {
            Ok(reply) => {
                session.turn_count += 1;
                log::info!(
                    "Agent '{}' replied on conversation {} after {:?}",
                    agent.name,
                    session.conversation_id,
                    budget.elapsed()
                );
                TurnOutcome::success(
                    reply,
                    session.conversation_id.clone(),
                    session.watermark.clone(),
                )
            }
            Err(e) => {
                log::warn!(
                    "Agent '{}' turn on conversation {} failed: {e}",
                    agent.name,
                    session.conversation_id
                );
                TurnOutcome::failure(
                    &e,
                    Some(session.conversation_id.clone()),
                    session.watermark.clone(),
                )
            }
        }
    }

    /// Lock the caller's session, or start a new one
    ///
    /// A session retired by an expiry restart hands over to its replacement.
    /// Returns the locked session and whether it was an existing one.
    async fn acquire_session(
        &self,
        agent: &AgentDefinition,
        conversation_id: Option<&ConversationId>,
        budget: &TurnBudget<'_, C>,
    ) -> Result<(SessionGuard, bool)> {
        let mut next = conversation_id.cloned();

        while let Some(conversation_id) = next.take() {
            let Some(handle) = self.store.get(&conversation_id) else {
                log::info!("Unknown conversation {conversation_id}; starting a new one");
                break;
            };

            let wait = async { Ok::<_, AgentError>(handle.lock_owned().await) };
            let guard = budget
                .bounded("waiting for the previous turn on this conversation", wait)
                .await?;

            if guard.retired {
                match &guard.replaced_by {
                    Some(replacement) => {
                        log::info!("Conversation {conversation_id} was replaced by {replacement}");
                        next = Some(replacement.clone());
                    }
                    None => {
                        log::info!("Conversation {conversation_id} was retired; starting a new one");
                    }
                }
            } else if guard.agent_name != agent.name {
                log::info!(
                    "Conversation {conversation_id} belongs to agent '{}', not '{}'; starting a new one",
                    guard.agent_name,
                    agent.name
                );
            } else {
                return Ok((guard, true));
            }
        }

        Ok((self.start_conversation(agent, budget).await?, false))
    }

    /// Start a conversation on the channel and register it, locked
    async fn start_conversation(
        &self,
        agent: &AgentDefinition,
        budget: &TurnBudget<'_, C>,
    ) -> Result<SessionGuard> {
        let start = budget
            .bounded("starting a conversation", self.transport.start_session(agent))
            .await?;

        let session = ConversationSession::new(&agent.name, start.conversation_id, self.clock.now());
        Ok(self.store.insert_locked(session).await)
    }

    /// Post the query, then poll for the reply
    async fn run_turn(
        &self,
        agent: &AgentDefinition,
        session: &mut SessionGuard,
        reused: bool,
        query: &str,
        options: &TurnOptions,
        budget: &TurnBudget<'_, C>,
    ) -> Result<String> {
        let (posted, posted_at) = self.post_query(agent, session, reused, query, budget).await?;
        self.await_reply(agent, session, &posted, posted_at, options, budget)
            .await
    }

    /// Post the query, restarting the conversation once if the channel has expired it
    async fn post_query(
        &self,
        agent: &AgentDefinition,
        session: &mut SessionGuard,
        mut reused: bool,
        query: &str,
        budget: &TurnBudget<'_, C>,
    ) -> Result<(ActivityId, DateTime<Utc>)> {
        let mut restarted = false;

        loop {
            let posted_at = self.clock.now();
            let post = self
                .transport
                .post_message(agent, &session.conversation_id, query);

            match budget.bounded("posting the query", post).await {
                Ok(activity_id) => return Ok((activity_id, posted_at)),
                Err(e) if !restarted && is_stale_conversation(&e, reused) => {
                    log::info!(
                        "Conversation {} is no longer usable ({e}); restarting",
                        session.conversation_id
                    );
                    session.retired = true;
                    self.store.remove(&session.conversation_id);

                    let replacement = self.start_conversation(agent, budget).await?;
                    session.replaced_by = Some(replacement.conversation_id.clone());
                    *session = replacement;
                    restarted = true;
                    reused = false;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a post failure means the conversation died server-side
///
/// Expiry is always stale. An authorization failure counts only when the
/// conversation predates this turn; on a fresh one it is a bad credential.
fn is_stale_conversation(error: &AgentError, reused: bool) -> bool {
    match error {
        AgentError::ConversationExpired(_) => true,
        AgentError::Auth(_) => reused,
        _ => false,
    }
}
