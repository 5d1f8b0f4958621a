use std::sync::Arc;

use super::args::{QueryAgentArgs, QueryAgentResponse};
use crate::error::{AgentError, Result};
use crate::manager::{Clock, SessionManager, SystemClock};
use crate::transport::ChannelTransport;
use crate::types::ConversationId;

/// Tool name
pub const QUERY_AGENT: &str = "query_agent";

/// Validated `query_agent` arguments
#[derive(Debug, PartialEq, Eq)]
struct QueryRequest<'a> {
    agent_name: &'a str,
    query: &'a str,
    conversation_id: Option<ConversationId>,
}

/// `query_agent`: forward a query to a named agent and return its reply
pub struct QueryAgentTool<T, C = SystemClock> {
    manager: Arc<SessionManager<T, C>>,
}

impl<T, C> Clone for QueryAgentTool<T, C> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<T: ChannelTransport, C: Clock> QueryAgentTool<T, C> {
    /// Create the tool over a shared session manager
    #[must_use]
    pub fn new(manager: Arc<SessionManager<T, C>>) -> Self {
        Self { manager }
    }

    /// Run one query turn
    ///
    /// Never fails: invalid arguments and agent errors come back as an error
    /// response.
    pub async fn execute(&self, args: QueryAgentArgs) -> QueryAgentResponse {
        let request = match validate(&args) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("Rejecting {QUERY_AGENT} call: {e}");
                return QueryAgentResponse::rejected(&e);
            }
        };

        self.manager
            .send_and_wait(
                request.agent_name,
                request.query,
                request.conversation_id.as_ref(),
            )
            .await
            .into()
    }
}

fn validate(args: &QueryAgentArgs) -> Result<QueryRequest<'_>> {
    let agent_name = args.agent_name.trim();
    if agent_name.is_empty() {
        return Err(AgentError::invalid_arguments("agent_name must not be empty"));
    }
    if args.query.trim().is_empty() {
        return Err(AgentError::invalid_arguments("query must not be empty"));
    }

    let conversation_id = args
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ConversationId::from);

    Ok(QueryRequest {
        agent_name,
        query: &args.query,
        conversation_id,
    })
}
