//! Session layer configuration.

use std::time::Duration;

/// How the inactivity reaper behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperConfig {
    /// A session idle for longer than this is torn down.
    pub idle_timeout: Duration,

    /// How often the registry is swept.
    pub sweep_interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl ReaperConfig {
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaper_config_defaults() {
        let config = ReaperConfig::default();
        assert_eq!(config.idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_reaper_config_builders() {
        let config = ReaperConfig::default()
            .with_idle_timeout(Duration::from_secs(10))
            .with_sweep_interval(Duration::from_secs(1));
        assert_eq!(config.idle_timeout, Duration::from_secs(10));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
    }
}
