use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::address;
use crate::config::SettingsStore;

/// Command to view or update the persisted settings
pub struct ConfigCommand {
    api_url: Option<String>,
    idle_start: Option<String>,
    idle_end: Option<String>,
    state_dir: PathBuf,
}

impl ConfigCommand {
    pub fn new(
        api_url: Option<String>,
        idle_start: Option<String>,
        idle_end: Option<String>,
        state_dir: PathBuf,
    ) -> Self {
        Self {
            api_url,
            idle_start,
            idle_end,
            state_dir,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let store = SettingsStore::new(&self.state_dir);
        let mut settings = store.load().await;

        let mut changed = false;
        if let Some(raw) = &self.api_url {
            let normalized = address::normalize(raw);
            if normalized != *raw {
                info!("Normalized companion app address: {}", normalized);
            }
            settings.api_url = normalized;
            changed = true;
        }
        if let Some(start) = &self.idle_start {
            settings.idle_start_time = start.clone();
            changed = true;
        }
        if let Some(end) = &self.idle_end {
            settings.idle_end_time = end.clone();
            changed = true;
        }

        if changed {
            store.save(&settings).await?;
            info!("✅ Settings updated.");
        }

        println!("{}", serde_json::to_string_pretty(&settings)?);
        Ok(())
    }
}
