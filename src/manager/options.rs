//! Per-turn knobs

use serde::Deserialize;
use std::time::Duration;

/// Default wall-clock budget for one turn
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between activity polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What to return when one poll window holds several bot messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyPolicy {
    /// The earliest qualifying message; later ones in the window are dropped
    #[default]
    First,
    /// Every qualifying message of the window, joined by a blank line
    Concatenate,
}

impl ReplyPolicy {
    pub(crate) fn combine(self, replies: Vec<&str>) -> Option<String> {
        match self {
            Self::First => replies.into_iter().next().map(str::to_string),
            Self::Concatenate if replies.is_empty() => None,
            Self::Concatenate => Some(replies.join("\n\n")),
        }
    }
}

/// Options for a single `send_and_wait` turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOptions {
    /// Total wall-clock budget, covering session start, post and polling
    pub timeout: Duration,
    /// Delay between polls that found no reply
    pub poll_interval: Duration,
    /// Optional cap on the number of polls
    pub max_polls: Option<u32>,
    /// Multi-message handling
    pub reply_policy: ReplyPolicy,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TURN_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            reply_policy: ReplyPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_policy_keeps_earliest() {
        assert_eq!(
            ReplyPolicy::First.combine(vec!["one", "two"]),
            Some("one".to_string())
        );
        assert_eq!(ReplyPolicy::First.combine(vec![]), None);
    }

    #[test]
    fn concatenate_policy_joins_window() {
        assert_eq!(
            ReplyPolicy::Concatenate.combine(vec!["one", "two"]),
            Some("one\n\ntwo".to_string())
        );
        assert_eq!(ReplyPolicy::Concatenate.combine(vec![]), None);
    }
}
