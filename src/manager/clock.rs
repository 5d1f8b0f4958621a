//! Time source for turn budgets and poll delays

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// Wall clock plus sleep, injectable so tests can run turns without real delays
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend for `duration`
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// System clock backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Elapsed wall-clock time since `since`, clamped at zero
pub(crate) fn elapsed_since<C: Clock>(clock: &C, since: DateTime<Utc>) -> Duration {
    clock
        .now()
        .signed_duration_since(since)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
