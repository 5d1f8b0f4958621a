//! Result of one query turn
//!
//! Every turn resolves to a [`TurnOutcome`]; failures are data, never panics
//! or errors escaping to the tool layer.

use serde::Serialize;

use super::identifiers::{ConversationId, Watermark};
use crate::error::{AgentError, ErrorKind};

/// Whether the turn produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// A bot reply was received
    Success,
    /// The turn failed; see `error_kind` and `error_detail`
    Error,
}

/// Structured result of `send_and_wait`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// Success or error
    pub status: TurnStatus,
    /// Reply text on success
    pub reply: Option<String>,
    /// Conversation the turn ran on, when one was established
    pub conversation_id: Option<ConversationId>,
    /// Stream position after the turn
    pub watermark: Option<Watermark>,
    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Human-readable failure description
    pub error_detail: Option<String>,
}

impl TurnOutcome {
    /// Successful turn carrying the agent's reply
    pub fn success(
        reply: impl Into<String>,
        conversation_id: ConversationId,
        watermark: Option<Watermark>,
    ) -> Self {
        Self {
            status: TurnStatus::Success,
            reply: Some(reply.into()),
            conversation_id: Some(conversation_id),
            watermark,
            error_kind: None,
            error_detail: None,
        }
    }

    /// Failed turn
    #[must_use]
    pub fn failure(
        error: &AgentError,
        conversation_id: Option<ConversationId>,
        watermark: Option<Watermark>,
    ) -> Self {
        Self {
            status: TurnStatus::Error,
            reply: None,
            conversation_id,
            watermark,
            error_kind: Some(error.kind()),
            error_detail: Some(error.to_string()),
        }
    }

    /// Whether the turn succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TurnStatus::Success
    }
}
