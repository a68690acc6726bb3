use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::queue::QueueStore;

/// Command to drop every queued task
pub struct ClearCommand {
    state_dir: PathBuf,
}

impl ClearCommand {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = QueueStore::new(self.state_dir.clone());
        store.init().await?;

        let dropped = store.len().await?;
        store.clear().await?;
        info!("🧹 Cleared the local queue ({} task(s) removed).", dropped);
        Ok(())
    }
}
