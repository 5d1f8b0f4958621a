//! Core session manager structure and lifecycle management
//!
//! Provides the main `SessionManager` struct with constructors and shutdown.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::manager::clock::{Clock, SystemClock, elapsed_since};
use crate::manager::options::TurnOptions;
use crate::manager::store::SessionStore;
use crate::transport::ChannelTransport;
use crate::types::AgentCatalog;

// ============================================================================
// SESSION MANAGER CORE
// ============================================================================

/// Manager for conversations with the configured agents
///
/// The `SessionManager` owns every conversation's state, handling:
/// - Session lifecycle (start, reuse, transparent restart on expiry)
/// - Posting queries and polling for the matching reply
/// - Watermark tracking across turns
/// - Per-conversation serialisation of turns
pub struct SessionManager<T, C = SystemClock> {
    pub(super) catalog: Arc<AgentCatalog>,
    pub(super) transport: T,
    pub(super) clock: C,
    pub(super) store: SessionStore,
    pub(super) defaults: TurnOptions,
}

impl<T: ChannelTransport> SessionManager<T> {
    /// Create a manager driven by the system clock
    pub fn new(catalog: Arc<AgentCatalog>, transport: T) -> Self {
        Self::with_clock(catalog, transport, SystemClock)
    }
}

impl<T: ChannelTransport, C: Clock> SessionManager<T, C> {
    /// Create a manager with an explicit clock
    pub fn with_clock(catalog: Arc<AgentCatalog>, transport: T, clock: C) -> Self {
        Self {
            catalog,
            transport,
            clock,
            store: SessionStore::new(),
            defaults: TurnOptions::default(),
        }
    }

    /// Replace the options used by [`SessionManager::send_and_wait`]
    #[must_use]
    pub fn with_defaults(mut self, defaults: TurnOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// The agent catalog this manager resolves names against
    pub fn catalog(&self) -> &Arc<AgentCatalog> {
        &self.catalog
    }

    /// Options applied when the caller passes none
    pub fn defaults(&self) -> &TurnOptions {
        &self.defaults
    }

    /// Forget every session
    ///
    /// In-flight turns finish on the sessions they hold; later turns start
    /// fresh conversations.
    pub async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down SessionManager...");
        for conversation_id in self.store.ids() {
            log::debug!("Dropping session: {}", conversation_id);
        }
        let count = self.store.clear();
        log::info!("SessionManager shutdown complete ({count} session(s) dropped)");
        Ok(())
    }
}

// ============================================================================
// TURN BUDGET
// ============================================================================

/// Wall-clock budget of one turn
pub(super) struct TurnBudget<'a, C> {
    clock: &'a C,
    started: DateTime<Utc>,
    timeout: Duration,
}

impl<'a, C: Clock> TurnBudget<'a, C> {
    pub fn start(clock: &'a C, timeout: Duration) -> Self {
        Self {
            clock,
            started: clock.now(),
            timeout,
        }
    }

    pub fn elapsed(&self) -> Duration {
        elapsed_since(self.clock, self.started)
    }

    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_zero()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `fut` within what is left of the budget
    ///
    /// A response arriving after the deadline is dropped with the future.
    pub async fn bounded<F, R>(&self, what: &str, fut: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        match tokio::time::timeout(self.remaining(), fut).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::timeout(format!(
                "{what} did not complete within {}s",
                self.timeout.as_secs_f64()
            ))),
        }
    }
}
