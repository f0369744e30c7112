//! Engine configuration, read from the environment with sane defaults

use std::time::Duration;

use crate::orders::Station;

/// Runtime configuration for the order engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the order database file
    pub work_dir: String,
    /// Base station poll interval in seconds
    pub poll_interval_secs: u64,
    /// Faster interval for time-critical screens (kitchen, dispatch)
    pub hot_poll_interval_secs: u64,
    pub environment: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/order-engine".into()),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            hot_poll_interval_secs: std::env::var("HOT_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Path of the order database file under `work_dir`
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("orders.redb")
    }

    /// Poll interval for one station. Kitchen and dispatch screens turn
    /// over fastest, so they refresh on the hot interval.
    pub fn poll_interval(&self, station: Station) -> Duration {
        let secs = match station {
            Station::Kitchen | Station::Dispatch => self.hot_poll_interval_secs,
            _ => self.poll_interval_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
