//! Background sweep that retires idle sessions.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{ReaperConfig, SessionRegistry};

/// Spawns the reaper loop. It sweeps `registry` every
/// `config.sweep_interval`, tearing down sessions idle for longer than
/// `config.idle_timeout` after their history has been archived.
///
/// The loop runs until the returned task is aborted.
pub fn spawn_reaper(registry: Arc<Mutex<SessionRegistry>>, config: ReaperConfig) -> JoinHandle<()> {
    tracing::info!(
        idle_timeout_secs = config.idle_timeout.as_secs(),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "session reaper started"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let mut registry = registry.lock().await;
            let reaped = registry.reap_idle(config.idle_timeout).await;
            if !reaped.is_empty() {
                tracing::info!(
                    reaped = reaped.len(),
                    remaining = registry.session_count(),
                    "idle sweep complete"
                );
            }
        }
    })
}
