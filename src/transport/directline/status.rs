//! HTTP status classification for Direct Line responses

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::error::AgentError;

/// What the request was addressing, which decides how 404/410 read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// `POST /conversations`
    NewConversation,
    /// Any request under `/conversations/{id}`
    Conversation,
}

/// Longest error body echoed back into an error message
const MAX_BODY_IN_ERROR: usize = 300;

/// Map a non-success response onto the error taxonomy
pub(super) fn classify(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    scope: Scope,
) -> AgentError {
    let detail = describe(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::auth(detail),
        StatusCode::NOT_FOUND | StatusCode::GONE if scope == Scope::Conversation => {
            AgentError::conversation_expired(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => AgentError::rate_limited(retry_after),
        _ => AgentError::transport(detail),
    }
}

fn describe(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {status}");
    }
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    let truncated: String = message.chars().take(MAX_BODY_IN_ERROR).collect();
    format!("HTTP {status}: {truncated}")
}

/// Pull `error.message` (or `message`) out of a JSON error body
fn extract_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = json.get("error");
    let message = error
        .and_then(|e| e.get("message"))
        .or_else(|| json.get("message"))
        .and_then(|m| m.as_str())?;

    match error.and_then(|e| e.get("code")).and_then(|c| c.as_str()) {
        Some(code) => Some(format!("{message} (code: {code})")),
        None => Some(message.to_string()),
    }
}

/// Extract and parse the `Retry-After` header
pub(super) fn retry_after(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    parse_retry_after_value(value)
}

/// Parse a `Retry-After` value as whole seconds
///
/// Fractional seconds round up. HTTP-date values are ignored.
fn parse_retry_after_value(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        Some(secs.max(1))
    } else if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() && f > 0.0 {
            Some((f.ceil() as u64).max(1))
        } else {
            None
        }
    } else {
        None
    }
}
