//! Conversation session management
//!
//! Provides `SessionManager` for running query turns against the configured
//! agents while keeping each conversation's watermark between turns.
//!
//! # Module Structure
//!
//! - `session_manager` - Core `SessionManager` with public API
//! - `session` - Per-conversation state
//! - `store` - Keyed session store with per-conversation locking
//! - `helpers` - Pure helpers for picking the reply out of a poll window
//! - `clock` - Injectable time source
//! - `options` - Per-turn options

mod clock;
mod helpers;
mod options;
mod session;
mod session_manager;
mod store;

pub use clock::{Clock, SystemClock};
pub use options::{DEFAULT_POLL_INTERVAL, DEFAULT_TURN_TIMEOUT, ReplyPolicy, TurnOptions};
pub use session::SessionInfo;
pub use session_manager::SessionManager;
