use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::config::SettingsStore;
use crate::health::HealthMonitor;
use crate::maintenance;
use crate::queue::QueueStore;

/// Command to run the long-lived maintenance loop
pub struct WatchCommand {
    state_dir: PathBuf,
}

impl WatchCommand {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = QueueStore::new(self.state_dir.clone());
        store.init().await?;
        let monitor = HealthMonitor::new(SettingsStore::new(&self.state_dir));

        info!("✅ Starting maintenance watcher.");
        info!("Watching queue at: {:?}", self.state_dir);

        maintenance::run(&store, &monitor).await
    }
}
