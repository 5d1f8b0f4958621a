//! Conversation session manager implementation
//!
//! This module is organized into logical submodules:
//! - `core`: Core struct, constructors, turn budget and shutdown
//! - `turn`: Agent/session resolution and posting the query
//! - `poll`: Polling for the reply
//! - `info`: Session information queries

mod core;
mod info;
mod poll;
mod turn;

pub use core::SessionManager;
