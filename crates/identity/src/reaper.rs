//! Background sweep that deletes expired session records.
//!
//! Expired sessions are already unusable; the sweep exists to keep the
//! session store from growing without bound. Default cadence is weekly.

use std::sync::Arc;
use std::time::Duration;

use passgate_core::Clock;

use crate::store::SessionStore;

pub struct ExpiredSessionReaper {
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpiredSessionReaper {
    pub fn new(sessions: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            sessions,
            clock,
            interval,
        }
    }

    /// One sweep. Failures are logged and retried on the next tick.
    pub async fn sweep_once(&self) {
        tracing::debug!("Cleaning up expired refresh tokens");
        match self.sessions.delete_all_expired(self.clock.now()).await {
            Ok(count) => tracing::debug!(count, "Cleaned expired sessions"),
            Err(err) => tracing::error!(error = %err, "expired-session sweep failed"),
        }
    }

    /// Sweep forever at the configured interval. Runs until the task is
    /// dropped; the first sweep happens after one full interval.
    pub async fn run(self) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.sweep_once().await;
        }
    }
}
