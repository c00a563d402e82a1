use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::composer::SessionStore;
use crate::config::SessionConfig;
use crate::metrics::SessionMetrics;

/// Background task closing composer sessions nobody has touched recently
pub struct SessionReaperTask {
    config: SessionConfig,
    sessions: Arc<SessionStore>,
    shutdown: broadcast::Receiver<()>,
}

impl SessionReaperTask {
    pub fn new(
        config: SessionConfig,
        sessions: Arc<SessionStore>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            sessions,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let cleanup_interval = Duration::from_secs(self.config.cleanup_interval.max(1));
        let mut cleanup_timer = tokio::time::interval(cleanup_interval);

        // Skip immediate first tick
        cleanup_timer.tick().await;

        tracing::info!(
            cleanup_interval_secs = self.config.cleanup_interval,
            idle_timeout_secs = self.config.idle_timeout,
            "Session reaper started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Session reaper received shutdown signal");
                    break;
                }
                _ = cleanup_timer.tick() => {
                    self.sweep();
                }
            }
        }

        tracing::info!("Session reaper stopped");
    }

    /// Close idle sessions once; returns how many were closed
    pub fn sweep(&self) -> usize {
        let start = Instant::now();
        let idle_timeout = chrono::Duration::seconds(self.config.idle_timeout as i64);
        let expired = self.sessions.expire_idle(idle_timeout);
        SessionMetrics::observe_sweep(start.elapsed());

        if expired > 0 {
            tracing::info!(
                expired,
                remaining = self.sessions.count(),
                "Closed idle composer sessions"
            );
        }
        expired
    }
}
