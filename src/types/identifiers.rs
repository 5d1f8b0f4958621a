//! Newtype wrappers for type safety
//!
//! This module contains newtype wrappers that provide type safety by wrapping
//! the opaque strings handed out by the channel.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Newtype Wrappers for Type Safety
// ============================================================================

/// Conversation ID newtype for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Create a new conversation ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the conversation ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Activity ID newtype
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    /// Create a new activity ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the activity ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ActivityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ActivityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Position marker in a conversation's activity stream
///
/// Opaque to the bridge. Direct Line hands out decimal sequence numbers, so
/// two numeric watermarks are ordered numerically; anything else is only
/// ever replaced, never compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(String);

impl Watermark {
    /// Create a new watermark
    pub fn new(mark: impl Into<String>) -> Self {
        Self(mark.into())
    }

    /// Get the watermark as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn sequence(&self) -> Option<u64> {
        self.0.trim().parse().ok()
    }

    /// Compare two watermarks when both are numeric
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        Some(self.sequence()?.cmp(&other.sequence()?))
    }

    /// Whether `self` would move the stream position backwards from `current`
    #[must_use]
    pub fn precedes(&self, current: &Self) -> bool {
        matches!(self.compare(current), Some(Ordering::Less))
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Watermark {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Watermark {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_watermarks_compare_by_value() {
        let nine = Watermark::from("9");
        let ten = Watermark::from("10");
        assert_eq!(nine.compare(&ten), Some(Ordering::Less));
        assert!(nine.precedes(&ten));
        assert!(!ten.precedes(&nine));
        assert!(!ten.precedes(&ten));
    }

    #[test]
    fn opaque_watermarks_never_precede() {
        let a = Watermark::from("abc");
        let b = Watermark::from("7");
        assert_eq!(a.compare(&b), None);
        assert!(!a.precedes(&b));
        assert!(!b.precedes(&a));
    }
}
