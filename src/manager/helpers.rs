//! Helper functions for reply extraction
//!
//! Pure functions over one poll window; no I/O.

use chrono::{DateTime, Utc};

use super::options::ReplyPolicy;
use super::session::ConversationSession;
use crate::types::{Activity, ActivityId};

/// What a poll window yielded
#[derive(Debug, PartialEq, Eq)]
pub(super) enum WindowScan {
    /// A bot reply to hand back to the caller
    Reply(String),
    /// The agent signalled the end of its plan without replying
    PlanFinished,
    /// Nothing to act on yet
    Pending,
}

/// Scan one poll window for the reply to the activity posted as `posted`
///
/// Candidates are bot-authored message activities with non-empty text that
/// were not considered before. A message naming the activity it answers
/// must answer `posted`; one without `replyToId` must not be older than
/// `threshold`. Seeing the
/// echo of our own post lowers `threshold` to its server timestamp, so a
/// channel clock running behind ours does not hide the reply.
///
/// # Arguments
/// * `activities` - The window, oldest first
/// * `session` - Session whose seen-set and last activity id are updated
/// * `posted` - Id the channel assigned to the user's message
/// * `threshold` - Earliest acceptable reply timestamp
/// * `policy` - How to combine several replies in one window
pub(super) fn scan_window(
    activities: &[Activity],
    session: &mut ConversationSession,
    posted: &ActivityId,
    threshold: &mut DateTime<Utc>,
    policy: ReplyPolicy,
) -> WindowScan {
    let mut replies = Vec::new();
    let mut plan_finished = false;

    for activity in activities {
        if let Some(id) = &activity.id {
            session.last_activity_id = Some(id.clone());

            if id == posted {
                if let Some(echoed_at) = activity.timestamp
                    && echoed_at < *threshold
                {
                    *threshold = echoed_at;
                }
                continue;
            }

            if !session.mark_seen(id) {
                continue;
            }
        }

        if activity.is_plan_finished() {
            plan_finished = true;
            continue;
        }

        let Some(text) = activity.bot_text() else {
            continue;
        };

        if let Some(reply_to) = &activity.reply_to_id
            && reply_to != posted
        {
            log::debug!(
                "Conversation {}: skipping bot message answering {} (waiting on {})",
                session.conversation_id,
                reply_to.as_str(),
                posted.as_str()
            );
            continue;
        }

        if let Some(sent_at) = activity.timestamp
            && sent_at < *threshold
        {
            log::debug!(
                "Conversation {}: skipping bot message from {} (before {})",
                session.conversation_id,
                sent_at,
                threshold
            );
            continue;
        }

        replies.push(text);
    }

    if let Some(reply) = policy.combine(replies) {
        WindowScan::Reply(reply)
    } else if plan_finished {
        WindowScan::PlanFinished
    } else {
        WindowScan::Pending
    }
}
