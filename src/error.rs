//! Error types for the Copilot agent bridge

use serde::Serialize;
use thiserror::Error;

/// Main error type for the Copilot agent bridge
#[derive(Error, Debug)]
pub enum AgentError {
    /// No configured agent carries the requested name
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// The channel rejected the credential (HTTP 401/403)
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// The channel no longer knows the conversation (HTTP 404/410)
    #[error("Conversation expired: {0}")]
    ConversationExpired(String),

    /// The channel asked us to slow down (HTTP 429)
    #[error("Rate limited{}", retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited {
        /// Seconds to wait, from the `Retry-After` header when present
        retry_after: Option<u64>,
    },

    /// Network failure, unexpected HTTP status or undecodable body
    #[error("Transport error: {0}")]
    Transport(String),

    /// No reply arrived within the turn budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tool arguments failed validation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Stable classification of an [`AgentError`], reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`AgentError::UnknownAgent`]
    UnknownAgent,
    /// See [`AgentError::Auth`]
    AuthError,
    /// See [`AgentError::ConversationExpired`]
    ConversationExpired,
    /// See [`AgentError::RateLimited`]
    RateLimited,
    /// See [`AgentError::Transport`]
    TransportError,
    /// See [`AgentError::Timeout`]
    Timeout,
    /// Configuration, argument or serialization problems
    InvalidInput,
}

impl AgentError {
    /// Create an unknown agent error
    pub fn unknown_agent(name: impl Into<String>) -> Self {
        Self::UnknownAgent(name.into())
    }

    /// Create an authorization error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a conversation expired error
    pub fn conversation_expired(msg: impl Into<String>) -> Self {
        Self::ConversationExpired(msg.into())
    }

    /// Create a rate limited error
    #[must_use]
    pub fn rate_limited(retry_after: Option<u64>) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Classification reported alongside the message
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAgent(_) => ErrorKind::UnknownAgent,
            Self::Auth(_) => ErrorKind::AuthError,
            Self::ConversationExpired(_) => ErrorKind::ConversationExpired,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidConfig(_) | Self::InvalidArguments(_) | Self::Json(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Transport(format!("failed to decode channel response: {err}"))
        } else if err.is_timeout() {
            Self::Transport(format!("channel request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
