//! MCP server exposing the agent tools over rmcp

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use super::args::{QueryAgentArgs, QueryAgentResponse};
use super::list_agents::ListAgentsTool;
use super::query_agent::QueryAgentTool;
use crate::manager::SessionManager;
use crate::transport::DirectLineClient;
use crate::types::AgentCatalog;

/// MCP server over the Direct Line transport
#[derive(Clone)]
pub struct CopilotAgentServer {
    query_agent: QueryAgentTool<DirectLineClient>,
    list_agents: ListAgentsTool,
    instructions: String,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CopilotAgentServer {
    /// Create the server over a shared session manager
    #[must_use]
    pub fn new(manager: Arc<SessionManager<DirectLineClient>>) -> Self {
        let catalog = Arc::clone(manager.catalog());
        Self {
            instructions: instructions(&catalog),
            list_agents: ListAgentsTool::new(catalog),
            query_agent: QueryAgentTool::new(manager),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Send a query to a Copilot Studio agent and wait for its reply. \
                       Use list_agents for the available agent names. Pass the conversation_id \
                       from a previous response to continue that conversation."
    )]
    async fn query_agent(
        &self,
        Parameters(args): Parameters<QueryAgentArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.query_agent.execute(args).await;
        let contents = vec![
            Content::text(summary(&response)),
            Content::text(pretty(&response)?),
        ];
        if response.is_success() {
            Ok(CallToolResult::success(contents))
        } else {
            Ok(CallToolResult::error(contents))
        }
    }

    #[tool(description = "List the configured Copilot Studio agents with their descriptions.")]
    async fn list_agents(&self) -> Result<CallToolResult, McpError> {
        let listed = self.list_agents.execute();
        let mut summary = format!("📋 {} agent(s) configured", listed.agents.len());
        for agent in &listed.agents {
            summary.push_str(&format!("\n• {}: {}", agent.name, agent.description));
        }
        Ok(CallToolResult::success(vec![
            Content::text(summary),
            Content::text(pretty(&listed)?),
        ]))
    }
}

#[tool_handler]
impl ServerHandler for CopilotAgentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(self.instructions.clone()),
            ..Default::default()
        }
    }
}

/// Server instructions naming the configured agents
#[must_use]
pub fn instructions(catalog: &AgentCatalog) -> String {
    let mut text = String::from(
        "Forwards queries to Microsoft Copilot Studio agents over Direct Line. \
         Always pass the conversation_id from the previous response to continue a conversation.\n\n\
         **Agents:**\n",
    );
    for agent in catalog.iter() {
        text.push_str(&format!("• {}: {}\n", agent.name, agent.description));
    }
    text
}

fn summary(response: &QueryAgentResponse) -> String {
    let conversation = response
        .conversation_id
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);
    match (&response.response, &response.error_message) {
        (Some(reply), _) => format!("💬 Agent replied (conversation: {conversation})\n\n{reply}"),
        (None, error) => format!(
            "❌ Query failed (conversation: {conversation})\n{}",
            error.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::types::{ConversationId, TurnOutcome, Watermark};

    #[test]
    fn summary_shows_reply_and_conversation() {
        let response = QueryAgentResponse::from(TurnOutcome::success(
            "Hello".to_string(),
            ConversationId::from("conv-1"),
            Some(Watermark::from("3")),
        ));
        assert_eq!(summary(&response), "💬 Agent replied (conversation: conv-1)\n\nHello");
    }

    #[test]
    fn summary_shows_error() {
        let response = QueryAgentResponse::rejected(&AgentError::unknown_agent("Nope"));
        let text = summary(&response);
        assert!(text.starts_with("❌ Query failed (conversation: none)"));
        assert!(text.contains("Nope"));
    }
}
