//! Process configuration.
//!
//! Settings come from environment variables via the `config` crate:
//!
//! | Variable                 | Required | Meaning                                   |
//! |--------------------------|----------|-------------------------------------------|
//! | `DIRECTLINE_ENDPOINT`    | yes      | Default Direct Line base URL              |
//! | `COPILOT_AGENT_SECRET`   | yes      | Default Direct Line secret                |
//! | `AGENT_DEFINITIONS_PATH` | no       | Agent definitions file (`agent_definition.json`) |
//! | `TURN_TIMEOUT_SECS`      | no       | Per-turn budget (30)                      |
//! | `POLL_INTERVAL_MS`       | no       | Delay between polls (1000)                |
//! | `REPLY_POLICY`           | no       | `first` or `concatenate` (`first`)        |
//!
//! The definitions file holds either a single `{"name", "description"}`
//! object or a list of agents, each optionally carrying its own `endpoint`
//! and `secret` (or `secret_env`, naming a variable that holds it). Agents
//! without their own endpoint or secret use the defaults above.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::manager::{ReplyPolicy, TurnOptions};
use crate::types::{AgentCatalog, AgentDefinition, AgentSecret};

/// Name of the agent used when no definitions file exists
pub const DEFAULT_AGENT_NAME: &str = "Copilot Agent";

/// Description of the agent used when no definitions file exists
pub const DEFAULT_AGENT_DESCRIPTION: &str = "An agent that runs in the Microsoft copilot studio.";

/// Settings read from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Default Direct Line base URL.
    #[serde(default)]
    pub directline_endpoint: Option<String>,

    /// Default Direct Line secret.
    #[serde(default)]
    pub copilot_agent_secret: Option<String>,

    /// Path of the agent definitions file.
    #[serde(default = "default_definitions_path")]
    pub agent_definitions_path: PathBuf,

    /// Per-turn budget in seconds.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How several bot messages in one poll are combined.
    #[serde(default)]
    pub reply_policy: ReplyPolicy,
}

fn default_definitions_path() -> PathBuf {
    PathBuf::from("agent_definition.json")
}

fn default_turn_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// One entry of the definitions file
#[derive(Debug, Clone, Deserialize)]
struct AgentEntry {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    secret_env: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DefinitionsFile {
    List(Vec<AgentEntry>),
    Wrapped { agents: Vec<AgentEntry> },
    Single(AgentEntry),
}

impl DefinitionsFile {
    fn into_entries(self) -> Vec<AgentEntry> {
        match self {
            Self::List(entries) | Self::Wrapped { agents: entries } => entries,
            Self::Single(entry) => vec![entry],
        }
    }
}

impl Settings {
    /// Loads settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a present variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Options applied to every turn.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero timeout or poll interval.
    pub fn turn_options(&self) -> Result<TurnOptions> {
        if self.turn_timeout_secs == 0 {
            return Err(AgentError::invalid_config("TURN_TIMEOUT_SECS must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(AgentError::invalid_config("POLL_INTERVAL_MS must be positive"));
        }
        Ok(TurnOptions {
            timeout: Duration::from_secs(self.turn_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: None,
            reply_policy: self.reply_policy,
        })
    }

    /// Builds the agent catalog from the defaults and the definitions file.
    ///
    /// # Errors
    ///
    /// Returns an error when the required defaults are missing, the file is
    /// malformed, or an agent ends up without a valid endpoint or secret.
    pub fn load_catalog(&self) -> Result<AgentCatalog> {
        self.load_catalog_with(|var| std::env::var(var).ok())
    }

    /// Builds the catalog, resolving `secret_env` names through `lookup`
    fn load_catalog_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<AgentCatalog> {
        let endpoint = non_empty(self.directline_endpoint.as_deref());
        let secret = non_empty(self.copilot_agent_secret.as_deref());
        let (Some(endpoint), Some(secret)) = (endpoint, secret) else {
            return Err(AgentError::invalid_config(
                "Missing required environment variables: DIRECTLINE_ENDPOINT and/or COPILOT_AGENT_SECRET",
            ));
        };

        let entries = read_definitions(&self.agent_definitions_path)?;
        let mut agents = Vec::with_capacity(entries.len());
        for entry in entries {
            let agent_secret = match (&entry.secret, &entry.secret_env) {
                (Some(value), _) => value.clone(),
                (None, Some(var)) => lookup(var).ok_or_else(|| {
                    AgentError::invalid_config(format!(
                        "agent '{}' reads its secret from {var}, which is not set",
                        entry.name
                    ))
                })?,
                (None, None) => secret.to_string(),
            };
            agents.push(AgentDefinition::new(
                entry.name,
                entry.description,
                entry.endpoint.as_deref().unwrap_or(endpoint),
                AgentSecret::new(agent_secret),
            )?);
        }

        if agents.is_empty() {
            return Err(AgentError::invalid_config(format!(
                "{} defines no agents",
                self.agent_definitions_path.display()
            )));
        }

        AgentCatalog::new(agents)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn read_definitions(path: &Path) -> Result<Vec<AgentEntry>> {
    if !path.exists() {
        log::warn!(
            "{} not found, using default agent definition",
            path.display()
        );
        return Ok(vec![AgentEntry {
            name: DEFAULT_AGENT_NAME.to_string(),
            description: DEFAULT_AGENT_DESCRIPTION.to_string(),
            endpoint: None,
            secret: None,
            secret_env: None,
        }]);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentError::invalid_config(format!("failed to read {}: {e}", path.display()))
    })?;
    let file: DefinitionsFile = serde_json::from_str(&content).map_err(|e| {
        AgentError::invalid_config(format!("failed to parse {}: {e}", path.display()))
    })?;
    Ok(file.into_entries())
}
