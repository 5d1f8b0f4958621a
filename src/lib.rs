//! # Copilot Agent MCP Server
//!
//! An MCP server that forwards queries to Microsoft Copilot Studio agents over
//! the Bot Framework Direct Line 3.0 channel and returns their replies.
//!
//! ## Quick Start
//!
//! ```no_run
//! use copilot_agent_mcp::{Settings, serve_stdio};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     serve_stdio(&settings).await
//! }
//! ```
//!
//! ## Querying Agents Directly
//!
//! The [`SessionManager`] can be used without the MCP layer:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use copilot_agent_mcp::{DirectLineClient, SessionManager, Settings};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Arc::new(Settings::from_env()?.load_catalog()?);
//! let manager = SessionManager::new(catalog, DirectLineClient::new()?);
//!
//! let first = manager.send_and_wait("HR Helper", "How many vacation days do I have?", None).await;
//! let follow_up = manager
//!     .send_and_wait("HR Helper", "And sick days?", first.conversation_id.as_ref())
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: Agent definitions, Direct Line wire types, and turn outcomes
//! - [`transport`]: The [`ChannelTransport`] seam and its Direct Line client
//! - [`manager`]: Conversation sessions, watermarks, and the send-and-wait turn
//! - [`tools`]: The `query_agent` and `list_agents` MCP tools
//! - [`config`]: Environment settings and the agent definitions file
//! - [`error`]: Error types and their classification
//!
//! ## Error Handling
//!
//! Library operations return [`Result<T, AgentError>`](Result). Query turns
//! never fail outright: they resolve to a [`TurnOutcome`] whose `error_kind`
//! classifies what went wrong.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod manager;
pub mod tools;
pub mod transport;
pub mod types;

use std::sync::Arc;

use rmcp::ServiceExt;

pub use config::Settings;
pub use error::{AgentError, ErrorKind, Result};
pub use manager::{Clock, ReplyPolicy, SessionInfo, SessionManager, SystemClock, TurnOptions};
pub use tools::{CopilotAgentServer, ListAgentsTool, QueryAgentArgs, QueryAgentResponse, QueryAgentTool};
pub use transport::{ChannelTransport, DirectLineClient};
pub use types::{AgentCatalog, AgentDefinition, ConversationId, TurnOutcome, TurnStatus, Watermark};

/// Version of the server
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve the agent tools over stdio until the client disconnects
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the MCP transport fails.
pub async fn serve_stdio(settings: &Settings) -> anyhow::Result<()> {
    let catalog = Arc::new(settings.load_catalog()?);
    let options = settings.turn_options()?;
    log::info!(
        "Serving {} agent(s): {}",
        catalog.len(),
        catalog.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
    );

    let manager = Arc::new(
        SessionManager::new(Arc::clone(&catalog), DirectLineClient::new()?).with_defaults(options),
    );

    let service = CopilotAgentServer::new(Arc::clone(&manager))
        .serve(rmcp::transport::stdio())
        .await?;
    let reason = service.waiting().await?;
    log::info!("MCP session ended: {reason:?}");

    manager.shutdown().await?;
    Ok(())
}
