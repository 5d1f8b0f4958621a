//! Type definitions for the Copilot agent bridge
//!
//! - [`identifiers`] - Type-safe wrappers (`ConversationId`, `ActivityId`, `Watermark`)
//! - [`agent`] - Agent definitions and the catalog
//! - [`activity`] - Direct Line activity wire types
//! - [`outcome`] - Structured result of a query turn

pub mod activity;
pub mod agent;
pub mod identifiers;
pub mod outcome;

pub use activity::{Activity, ActivitySet, ChannelAccount, ConversationStart, ResourceResponse};
pub use agent::{AgentCatalog, AgentDefinition, AgentSecret, AgentSummary};
pub use identifiers::{ActivityId, ConversationId, Watermark};
pub use outcome::{TurnOutcome, TurnStatus};
