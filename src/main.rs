// Copilot agent MCP server
//
// Serves the query_agent and list_agents tools over stdio. Logs go to stderr;
// stdout carries only the MCP protocol.

use anyhow::Result;
use copilot_agent_mcp::{Settings, serve_stdio};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let settings = Settings::from_env()?;
    if let Err(e) = serve_stdio(&settings).await {
        log::error!("copilot-agent-mcp failed: {e:#}");
        return Err(e);
    }
    Ok(())
}
