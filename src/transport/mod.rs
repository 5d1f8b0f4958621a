//! Transport layer for talking to the hosted agent's channel
//!
//! This module provides the transport abstraction and the Direct Line
//! implementation used in production.

pub mod directline;

use std::future::Future;

use crate::error::Result;
use crate::types::{ActivityId, ActivitySet, AgentDefinition, ConversationId, ConversationStart, Watermark};

/// Channel transport trait
///
/// Stateless wrapper around the three remote operations. Implementations
/// attach the agent's credential on every call and keep no session state
/// beyond what the caller passes in.
pub trait ChannelTransport: Send + Sync {
    /// Start a new conversation with the agent
    ///
    /// # Errors
    /// `Auth` on a rejected credential, `RateLimited` on 429, `Transport`
    /// otherwise
    fn start_session(
        &self,
        agent: &AgentDefinition,
    ) -> impl Future<Output = Result<ConversationStart>> + Send;

    /// Post the user's text as a new message activity
    ///
    /// # Errors
    /// As [`ChannelTransport::start_session`], plus `ConversationExpired` when
    /// the channel no longer knows the conversation
    fn post_message(
        &self,
        agent: &AgentDefinition,
        conversation_id: &ConversationId,
        text: &str,
    ) -> impl Future<Output = Result<ActivityId>> + Send;

    /// Fetch every activity newer than `watermark`, oldest first
    ///
    /// # Errors
    /// Same classification as [`ChannelTransport::post_message`]
    fn get_activities(
        &self,
        agent: &AgentDefinition,
        conversation_id: &ConversationId,
        watermark: Option<&Watermark>,
    ) -> impl Future<Output = Result<ActivitySet>> + Send;
}

pub use directline::DirectLineClient;
