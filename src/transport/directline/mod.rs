//! Direct Line REST transport
//!
//! Implements [`ChannelTransport`] against the Direct Line 3.0 REST surface:
//!
//! - `POST {endpoint}/conversations`
//! - `POST {endpoint}/conversations/{id}/activities`
//! - `GET  {endpoint}/conversations/{id}/activities?watermark={w}`
//!
//! Every request carries `Authorization: Bearer <secret>` for the agent it
//! addresses; the client itself holds no per-agent state.

mod status;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use self::status::Scope;
use super::ChannelTransport;
use crate::error::{AgentError, Result};
use crate::types::{
    Activity, ActivityId, ActivitySet, AgentDefinition, ConversationId, ConversationStart,
    ResourceResponse, Watermark,
};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Direct Line HTTP client shared by all agents
#[derive(Debug, Clone)]
pub struct DirectLineClient {
    client: reqwest::Client,
}

impl DirectLineClient {
    /// Create a client with the default timeouts
    ///
    /// # Errors
    /// Returns `Transport` if the TLS backend cannot be initialised
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AgentError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn headers(agent: &AgentDefinition) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", agent.secret.expose()))
            .map_err(|_| {
                AgentError::invalid_config(format!(
                    "secret for agent '{}' contains invalid header characters",
                    agent.name
                ))
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Send a request and decode a JSON body, classifying failures
    async fn execute<R: DeserializeOwned>(&self, request: RequestBuilder, scope: Scope) -> Result<R> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = status::retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(status::classify(status, retry_after, &body, scope));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            AgentError::transport(format!("unexpected response from channel: {e}"))
        })
    }

    fn activities_request(
        &self,
        agent: &AgentDefinition,
        conversation_id: &ConversationId,
        watermark: Option<&Watermark>,
    ) -> Result<RequestBuilder> {
        let url = conversation_url(&agent.endpoint, Some(conversation_id))?;
        let request = self.client.get(url).headers(Self::headers(agent)?);
        Ok(match watermark {
            Some(watermark) => request.query(&[("watermark", watermark.as_str())]),
            None => request,
        })
    }
}

/// Build `{endpoint}/conversations[/{id}/activities]`
fn conversation_url(endpoint: &str, conversation_id: Option<&ConversationId>) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| AgentError::invalid_config(format!("invalid endpoint '{endpoint}': {e}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| AgentError::invalid_config(format!("endpoint '{endpoint}' cannot be a base URL")))?;
        segments.pop_if_empty().push("conversations");
        if let Some(id) = conversation_id {
            segments.push(id.as_str()).push("activities");
        }
    }
    Ok(url)
}

impl ChannelTransport for DirectLineClient {
    async fn start_session(&self, agent: &AgentDefinition) -> Result<ConversationStart> {
        let url = conversation_url(&agent.endpoint, None)?;
        log::debug!("Starting conversation with agent '{}'", agent.name);

        let request = self.client.post(url).headers(Self::headers(agent)?);
        let start: ConversationStart = self.execute(request, Scope::NewConversation).await?;

        log::info!(
            "Agent '{}' started conversation {}",
            agent.name,
            start.conversation_id
        );
        Ok(start)
    }

    async fn post_message(
        &self,
        agent: &AgentDefinition,
        conversation_id: &ConversationId,
        text: &str,
    ) -> Result<ActivityId> {
        let url = conversation_url(&agent.endpoint, Some(conversation_id))?;
        let request = self
            .client
            .post(url)
            .headers(Self::headers(agent)?)
            .json(&Activity::user_message(text));

        let posted: ResourceResponse = self.execute(request, Scope::Conversation).await?;
        log::debug!(
            "Posted activity {} to conversation {}",
            posted.id.as_str(),
            conversation_id
        );
        Ok(posted.id)
    }

    async fn get_activities(
        &self,
        agent: &AgentDefinition,
        conversation_id: &ConversationId,
        watermark: Option<&Watermark>,
    ) -> Result<ActivitySet> {
        let request = self.activities_request(agent, conversation_id, watermark)?;
        let set: ActivitySet = self.execute(request, Scope::Conversation).await?;
        log::trace!(
            "Conversation {}: {} activities, watermark {:?}",
            conversation_id,
            set.activities.len(),
            set.watermark
        );
        Ok(set)
    }
}
