//! Session state structures
//!
//! Defines the per-conversation state kept between turns.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::types::{ActivityId, ConversationId, Watermark};

/// How many considered activity ids a session remembers
const SEEN_CAPACITY: usize = 256;

/// Local state binding a conversation to its watermark and owning agent
pub(super) struct ConversationSession {
    /// Agent the conversation was started with
    pub agent_name: String,

    /// Channel-assigned conversation id
    pub conversation_id: ConversationId,

    /// Position of the last poll; `None` until the first poll returns one
    pub watermark: Option<Watermark>,

    /// Id of the last activity observed in any poll
    pub last_activity_id: Option<ActivityId>,

    /// Activity ids already considered as reply candidates (FIFO with capacity limit)
    seen: VecDeque<ActivityId>,

    /// When the conversation was started
    pub created_at: DateTime<Utc>,

    /// Completed turns
    pub turn_count: u32,

    /// Set once the session has been replaced after a server-side expiry
    pub retired: bool,

    /// Conversation that took over from this one, when retired
    pub replaced_by: Option<ConversationId>,
}

impl ConversationSession {
    pub fn new(
        agent_name: impl Into<String>,
        conversation_id: ConversationId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            conversation_id,
            watermark: None,
            last_activity_id: None,
            seen: VecDeque::with_capacity(SEEN_CAPACITY),
            created_at,
            turn_count: 0,
            retired: false,
            replaced_by: None,
        }
    }

    /// Move the watermark forward
    ///
    /// A missing watermark leaves the current one in place, as does a numeric
    /// one that would move backwards. Returns whether the watermark changed.
    pub fn advance_watermark(&mut self, next: Option<Watermark>) -> bool {
        let Some(next) = next else {
            return false;
        };

        if let Some(current) = &self.watermark {
            if next.precedes(current) {
                log::warn!(
                    "Conversation {}: ignoring watermark {} behind current {}",
                    self.conversation_id,
                    next,
                    current
                );
                return false;
            }
            if *current == next {
                return false;
            }
        }

        self.watermark = Some(next);
        true
    }

    /// Record an activity as considered; false when it already was
    pub fn mark_seen(&mut self, id: &ActivityId) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.seen.len() == SEEN_CAPACITY {
            self.seen.pop_front();
        }
        self.seen.push_back(id.clone());
        true
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            agent_name: self.agent_name.clone(),
            conversation_id: self.conversation_id.clone(),
            watermark: self.watermark.clone(),
            last_activity_id: self.last_activity_id.clone(),
            created_at: self.created_at,
            turn_count: self.turn_count,
        }
    }
}

/// Snapshot of a conversation session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    /// Agent the conversation belongs to
    pub agent_name: String,
    /// Conversation id
    pub conversation_id: ConversationId,
    /// Current watermark
    pub watermark: Option<Watermark>,
    /// Last activity observed
    pub last_activity_id: Option<ActivityId>,
    /// When the conversation was started
    pub created_at: DateTime<Utc>,
    /// Completed turns
    pub turn_count: u32,
}
