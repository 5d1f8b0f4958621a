//! Tool argument and response types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, ErrorKind};
use crate::types::{AgentSummary, ConversationId, TurnOutcome, TurnStatus, Watermark};

// ============================================================================
// ARGS STRUCTS
// ============================================================================

/// Arguments of `query_agent`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryAgentArgs {
    /// Name of the agent to query, as listed by `list_agents`
    pub agent_name: String,

    /// Query to send to the agent
    pub query: String,

    /// The conversation ID returned from a previous response, for continuing that conversation
    #[serde(default)]
    pub conversation_id: Option<String>,
}

// ============================================================================
// RESPONSE STRUCTS
// ============================================================================

/// Result object of `query_agent`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAgentResponse {
    /// "success" or "error"
    pub status: TurnStatus,

    /// The agent's reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// What went wrong
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    /// Conversation to pass back on the next call
    pub conversation_id: Option<ConversationId>,

    /// Stream position after this turn
    pub watermark: Option<Watermark>,
}

impl QueryAgentResponse {
    /// Error response for arguments rejected before reaching the agent
    #[must_use]
    pub fn rejected(error: &AgentError) -> Self {
        Self::from(TurnOutcome::failure(error, None, None))
    }

    /// Whether the turn succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TurnStatus::Success
    }
}

impl From<TurnOutcome> for QueryAgentResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            status: outcome.status,
            response: outcome.reply,
            error_message: outcome.error_detail,
            error_kind: outcome.error_kind,
            conversation_id: outcome.conversation_id,
            watermark: outcome.watermark,
        }
    }
}

/// Result object of `list_agents`
#[derive(Debug, Clone, Serialize)]
pub struct ListAgentsResponse {
    /// Configured agents
    pub agents: Vec<AgentSummary>,
}
