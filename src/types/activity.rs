//! Channel activity types
//!
//! Mirrors the subset of the Direct Line activity schema the bridge reads and
//! writes. Field names follow the wire format (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::identifiers::{ActivityId, ConversationId, Watermark};

/// Activity type carrying user-visible text
pub const MESSAGE_ACTIVITY: &str = "message";

/// Activity type for out-of-band signals
pub const EVENT_ACTIVITY: &str = "event";

/// Event emitted by generative agents once their plan has completed
pub const PLAN_FINISHED_EVENT: &str = "DynamicPlanFinished";

/// Role the channel assigns to agent-authored activities
pub const BOT_ROLE: &str = "bot";

/// Account id the bridge posts as
pub const USER_ACCOUNT_ID: &str = "user";

/// Sender or recipient of an activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    /// Channel-specific account id
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// "bot" or "user"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// One unit exchanged over the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Channel-assigned id (absent on outgoing activities)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ActivityId>,

    /// Activity type ("message", "typing", "event", ...)
    #[serde(rename = "type")]
    pub activity_type: String,

    /// Author of the activity
    #[serde(default)]
    pub from: ChannelAccount,

    /// Message text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Server timestamp; unparseable values are treated as absent
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    /// Event name for `type == "event"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Activity this one answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<ActivityId>,
}

impl Activity {
    /// Outgoing plain-text message from the bridge's user account
    pub fn user_message(text: impl Into<String>) -> Self {
        Self {
            id: None,
            activity_type: MESSAGE_ACTIVITY.to_string(),
            from: ChannelAccount {
                id: USER_ACCOUNT_ID.to_string(),
                name: None,
                role: Some("user".to_string()),
            },
            text: Some(text.into()),
            timestamp: None,
            name: None,
            reply_to_id: None,
        }
    }

    /// Whether this is a `message` activity
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.activity_type == MESSAGE_ACTIVITY
    }

    /// Whether the agent, not the user, authored this activity
    #[must_use]
    pub fn is_from_bot(&self) -> bool {
        self.from.role.as_deref() == Some(BOT_ROLE) && self.from.id != USER_ACCOUNT_ID
    }

    /// Whether this marks the end of a generative agent's plan
    #[must_use]
    pub fn is_plan_finished(&self) -> bool {
        self.activity_type == EVENT_ACTIVITY && self.name.as_deref() == Some(PLAN_FINISHED_EVENT)
    }

    /// Non-empty text of a bot-authored message, if this is one
    #[must_use]
    pub fn bot_text(&self) -> Option<&str> {
        if !self.is_message() || !self.is_from_bot() {
            return None;
        }
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        DateTime::parse_from_rfc3339(&value)
            .map(|parsed| parsed.with_timezone(&Utc))
            .ok()
    }))
}

/// Page of activities returned by one poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySet {
    /// Activities newer than the requested watermark, oldest first
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Position to request from on the next poll
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
}

/// Response to starting a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStart {
    /// Id of the new conversation
    pub conversation_id: ConversationId,
    /// Conversation-scoped token for the streaming socket
    #[serde(default, rename = "token", skip_serializing_if = "Option::is_none")]
    pub stream_token: Option<String>,
    /// Token lifetime in seconds
    #[serde(default, rename = "expires_in", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Websocket URL for streaming clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
}

/// Response to posting an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceResponse {
    /// Id the channel assigned to the posted activity
    pub id: ActivityId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_directline_activity_set() {
        let set: ActivitySet = serde_json::from_value(json!({
            "activities": [
                {
                    "type": "message",
                    "id": "abc|0000001",
                    "timestamp": "2025-03-01T10:15:30.1234567Z",
                    "from": {"id": "user", "role": "user"},
                    "text": "hello"
                },
                {
                    "type": "typing",
                    "id": "abc|0000002",
                    "from": {"id": "cr_bot", "name": "Helper", "role": "bot"}
                },
                {
                    "type": "message",
                    "id": "abc|0000003",
                    "timestamp": "garbage",
                    "from": {"id": "cr_bot", "role": "bot"},
                    "text": "Hi there",
                    "replyToId": "abc|0000001"
                }
            ],
            "watermark": "3"
        }))
        .unwrap();

        assert_eq!(set.watermark, Some(Watermark::from("3")));
        assert_eq!(set.activities.len(), 3);
        assert!(set.activities[0].timestamp.is_some());
        assert_eq!(set.activities[0].bot_text(), None);
        assert_eq!(set.activities[1].bot_text(), None);
        assert_eq!(set.activities[2].timestamp, None);
        assert_eq!(set.activities[2].bot_text(), Some("Hi there"));
        assert_eq!(
            set.activities[2].reply_to_id,
            Some(ActivityId::from("abc|0000001"))
        );
    }

    #[test]
    fn user_message_serializes_minimal_payload() {
        let value = serde_json::to_value(Activity::user_message("ping")).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "message",
                "from": {"id": "user", "role": "user"},
                "text": "ping"
            })
        );
    }

    #[test]
    fn recognises_plan_finished_event() {
        let activity: Activity = serde_json::from_value(json!({
            "type": "event",
            "name": "DynamicPlanFinished",
            "from": {"id": "cr_bot", "role": "bot"}
        }))
        .unwrap();
        assert!(activity.is_plan_finished());
        assert_eq!(activity.bot_text(), None);
    }

    #[test]
    fn decodes_conversation_start() {
        let start: ConversationStart = serde_json::from_value(json!({
            "conversationId": "conv-1",
            "token": "tok",
            "expires_in": 3600,
            "streamUrl": "wss://example/stream"
        }))
        .unwrap();
        assert_eq!(start.conversation_id, ConversationId::from("conv-1"));
        assert_eq!(start.stream_token.as_deref(), Some("tok"));
    }
}
