//! MCP tools for querying Copilot Studio agents
//!
//! Provides `query_agent` and `list_agents`, and the rmcp server hosting them.

mod args;
mod list_agents;
mod query_agent;
mod server;

pub use args::{ListAgentsResponse, QueryAgentArgs, QueryAgentResponse};
pub use list_agents::{LIST_AGENTS, ListAgentsTool};
pub use query_agent::{QUERY_AGENT, QueryAgentTool};
pub use server::{CopilotAgentServer, instructions};
