//! Reply polling
//!
//! Bounded loop over `get_activities` that advances the watermark after every
//! poll and stops at the first qualifying bot reply.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::manager::clock::Clock;
use crate::manager::helpers::{WindowScan, scan_window};
use crate::manager::options::TurnOptions;
use crate::manager::session::ConversationSession;
use crate::transport::ChannelTransport;
use crate::types::{ActivityId, AgentDefinition};

use super::core::{SessionManager, TurnBudget};

/// Shortest pause between polls, whatever the options say
const MIN_POLL_DELAY: Duration = Duration::from_millis(10);

impl<T: ChannelTransport, C: Clock> SessionManager<T, C> {
    /// Poll until the reply to `posted` arrives or the budget runs out
    pub(super) async fn await_reply(
        &self,
        agent: &AgentDefinition,
        session: &mut ConversationSession,
        posted: &ActivityId,
        posted_at: DateTime<Utc>,
        options: &TurnOptions,
        budget: &TurnBudget<'_, C>,
    ) -> Result<String> {
        let mut threshold = posted_at;
        let mut polls: u32 = 0;

        loop {
            if budget.is_exhausted() {
                return Err(AgentError::timeout(format!(
                    "no reply from agent '{}' within {}s ({polls} polls)",
                    agent.name,
                    budget.timeout().as_secs_f64()
                )));
            }
            if let Some(max_polls) = options.max_polls
                && polls >= max_polls
            {
                return Err(AgentError::timeout(format!(
                    "no reply from agent '{}' after {polls} polls",
                    agent.name
                )));
            }
            polls += 1;

            let fetch = self.transport.get_activities(
                agent,
                &session.conversation_id,
                session.watermark.as_ref(),
            );

            let delay = match budget.bounded("polling for activities", fetch).await {
                Ok(set) => {
                    session.advance_watermark(set.watermark);
                    match scan_window(
                        &set.activities,
                        session,
                        posted,
                        &mut threshold,
                        options.reply_policy,
                    ) {
                        WindowScan::Reply(reply) => return Ok(reply),
                        WindowScan::PlanFinished => {
                            return Err(AgentError::timeout(format!(
                                "agent '{}' finished without a reply",
                                agent.name
                            )));
                        }
                        WindowScan::Pending => options.poll_interval,
                    }
                }
                Err(AgentError::RateLimited { retry_after }) => {
                    let hint = Duration::from_secs(retry_after.unwrap_or(0));
                    log::debug!(
                        "Conversation {}: rate limited while polling, backing off {:?}",
                        session.conversation_id,
                        hint.max(options.poll_interval)
                    );
                    hint.max(options.poll_interval)
                }
                Err(e) => return Err(e),
            };

            let remaining = budget.remaining();
            if !remaining.is_zero() {
                self.clock.sleep(delay.max(MIN_POLL_DELAY).min(remaining)).await;
            }
        }
    }
}
