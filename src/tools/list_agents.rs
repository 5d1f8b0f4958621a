use std::sync::Arc;

use super::args::ListAgentsResponse;
use crate::types::AgentCatalog;

/// Tool name
pub const LIST_AGENTS: &str = "list_agents";

/// `list_agents`: names and descriptions of the configured agents
#[derive(Clone)]
pub struct ListAgentsTool {
    catalog: Arc<AgentCatalog>,
}

impl ListAgentsTool {
    /// Create the tool over the shared catalog
    #[must_use]
    pub fn new(catalog: Arc<AgentCatalog>) -> Self {
        Self { catalog }
    }

    /// List the agents; secrets and endpoints are not included
    #[must_use]
    pub fn execute(&self) -> ListAgentsResponse {
        ListAgentsResponse {
            agents: self.catalog.summaries(),
        }
    }
}
