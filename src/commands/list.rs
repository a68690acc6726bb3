use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::queue::QueueStore;

/// Command to print the queued tasks
pub struct ListCommand {
    state_dir: PathBuf,
}

impl ListCommand {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = QueueStore::new(self.state_dir.clone());
        store.init().await?;

        let tasks = store.load().await?;
        info!("{} task(s) in the local queue", tasks.len());
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        Ok(())
    }
}
