use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::SettingsStore;
use crate::health::HealthMonitor;

/// Command to probe the companion app and report its status
pub struct CheckCommand {
    state_dir: PathBuf,
}

impl CheckCommand {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = SettingsStore::new(&self.state_dir);
        let monitor = HealthMonitor::new(settings);

        let status = monitor.check().await;
        if status.connected {
            info!("✅ Companion app connected: {}", status.message);
            if let Some(timestamp) = &status.timestamp {
                debug!("Companion app time: {}", timestamp);
            }
            Ok(())
        } else {
            Err(anyhow!("Companion app unreachable: {}", status.message))
        }
    }
}
