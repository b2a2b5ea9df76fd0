use std::time::Duration;

use bridgetable::prelude::*;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_HISTORY_DIR: &str = "game_history";

/// Settings read from `BRIDGETABLE_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    bind: String,
    /// `None` disables history persistence.
    history_dir: Option<String>,
    reaper: ReaperConfig,
}

impl Settings {
    fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let bind = lookup("BRIDGETABLE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let history_dir = match lookup("BRIDGETABLE_HISTORY_DIR") {
            Some(dir) if dir.trim().is_empty() => None,
            Some(dir) => Some(dir),
            None => Some(DEFAULT_HISTORY_DIR.to_string()),
        };

        let mut reaper = ReaperConfig::default();
        if let Some(secs) = seconds(&lookup, "BRIDGETABLE_IDLE_TIMEOUT_SECS")? {
            reaper = reaper.with_idle_timeout(secs);
        }
        if let Some(secs) = seconds(&lookup, "BRIDGETABLE_SWEEP_INTERVAL_SECS")? {
            reaper = reaper.with_sweep_interval(secs);
        }

        Ok(Self {
            bind,
            history_dir,
            reaper,
        })
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>, String> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(format!("{key} must be greater than zero")),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(e) => Err(format!("{key}={raw:?}: {e}")),
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bridgetable::init_tracing();

    let settings = Settings::from_env()?;
    tracing::info!(
        bind = %settings.bind,
        history_dir = settings.history_dir.as_deref().unwrap_or("<disabled>"),
        idle_timeout_secs = settings.reaper.idle_timeout.as_secs(),
        "starting bridge table server"
    );

    let mut builder = BridgeServer::builder()
        .bind(&settings.bind)
        .reaper(settings.reaper);
    if let Some(dir) = &settings.history_dir {
        builder = builder.history_dir(dir);
    }
    let server = builder.build().await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested");
        })
        .await?;
    Ok(())
}
