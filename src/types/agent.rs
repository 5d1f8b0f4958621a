//! Agent definitions and the catalog they are looked up in
//!
//! Agents are configured once at startup and never change afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{AgentError, Result};

// ============================================================================
// Credential
// ============================================================================

/// Direct Line secret for one agent
///
/// Never printed by `Debug`; only [`AgentSecret::expose`] hands out the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AgentSecret(String);

impl AgentSecret {
    /// Wrap a secret value
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building the `Authorization` header
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AgentSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AgentSecret").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Agent Definition
// ============================================================================

/// A hosted agent reachable over Direct Line
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    /// Name callers use to address the agent
    pub name: String,
    /// Human-readable description, surfaced in tool listings
    pub description: String,
    /// Base URL of the Direct Line API (without trailing slash)
    pub endpoint: String,
    /// Credential attached to every request
    pub secret: AgentSecret,
}

impl AgentDefinition {
    /// Build a definition, normalising and validating the endpoint
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        endpoint: impl Into<String>,
        secret: AgentSecret,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AgentError::invalid_config("agent name must not be empty"));
        }

        let endpoint = endpoint.into().trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&endpoint).map_err(|e| {
            AgentError::invalid_config(format!("agent '{name}' has invalid endpoint '{endpoint}': {e}"))
        })?;

        if secret.expose().trim().is_empty() {
            return Err(AgentError::invalid_config(format!(
                "agent '{name}' has an empty secret"
            )));
        }

        Ok(Self {
            name,
            description: description.into(),
            endpoint,
            secret,
        })
    }
}

/// Public view of an agent, safe to hand to tool callers
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    /// Agent name
    pub name: String,
    /// Agent description
    pub description: String,
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable name-to-definition table built once at startup
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: Vec<AgentDefinition>,
    by_name: HashMap<String, usize>,
}

impl AgentCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn new(agents: Vec<AgentDefinition>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(agents.len());
        for (index, agent) in agents.iter().enumerate() {
            if by_name.insert(agent.name.clone(), index).is_some() {
                return Err(AgentError::invalid_config(format!(
                    "agent '{}' is defined more than once",
                    agent.name
                )));
            }
        }
        Ok(Self { agents, by_name })
    }

    /// Look up an agent by name
    ///
    /// Exact matches win; otherwise a case-insensitive match is accepted.
    pub fn get(&self, name: &str) -> Result<&AgentDefinition> {
        let name = name.trim();
        if let Some(&index) = self.by_name.get(name) {
            return Ok(&self.agents[index]);
        }
        self.agents
            .iter()
            .find(|agent| agent.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| AgentError::unknown_agent(name))
    }

    /// All agents in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.agents.iter()
    }

    /// Name and description of every agent
    #[must_use]
    pub fn summaries(&self) -> Vec<AgentSummary> {
        self.agents
            .iter()
            .map(|agent| AgentSummary {
                name: agent.name.clone(),
                description: agent.description.clone(),
            })
            .collect()
    }

    /// Number of configured agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str) -> AgentDefinition {
        AgentDefinition::new(
            name,
            "test agent",
            "https://directline.example.com/v3/directline/",
            AgentSecret::new("s3cret"),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_is_normalised() {
        assert_eq!(
            agent("HR").endpoint,
            "https://directline.example.com/v3/directline"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = AgentDefinition::new("HR", "", "not a url", AgentSecret::new("x"));
        assert!(matches!(result, Err(AgentError::InvalidConfig(_))));
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let rendered = format!("{:?}", agent("HR"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn lookup_prefers_exact_then_case_insensitive() {
        let catalog = AgentCatalog::new(vec![agent("HR Helper"), agent("IT Desk")]).unwrap();
        assert_eq!(catalog.get("IT Desk").unwrap().name, "IT Desk");
        assert_eq!(catalog.get("hr helper").unwrap().name, "HR Helper");
        assert!(matches!(
            catalog.get("Finance"),
            Err(AgentError::UnknownAgent(name)) if name == "Finance"
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = AgentCatalog::new(vec![agent("HR"), agent("HR")]);
        assert!(matches!(result, Err(AgentError::InvalidConfig(_))));
    }
}
