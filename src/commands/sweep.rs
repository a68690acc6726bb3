use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::maintenance;
use crate::queue::QueueStore;

/// Command to run one eviction sweep over the queue
pub struct SweepCommand {
    state_dir: PathBuf,
}

impl SweepCommand {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = QueueStore::new(self.state_dir.clone());
        store.init().await?;

        let evicted = maintenance::sweep(&store).await?;
        info!("✅ Sweep complete. Evicted {} stale task(s).", evicted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ItemData, Platform, Task};
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sweep_command_evicts_stale_tasks() {
        let temp_dir = TempDir::new().unwrap();
        let store = QueueStore::new(temp_dir.path().to_path_buf());
        store.init().await.unwrap();

        let data = ItemData {
            url: Some("https://youtu.be/old".to_string()),
            title: Some("Old video".to_string()),
            ..Default::default()
        };
        let mut stale = Task::build(Platform::Youtube, &data).unwrap();
        stale.added_time = (Utc::now() - chrono::Duration::hours(48)).to_rfc3339();
        store.append(&stale).await.unwrap();

        let sweep_cmd = SweepCommand::new(temp_dir.path().to_path_buf());
        sweep_cmd.execute().await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
    }
}
