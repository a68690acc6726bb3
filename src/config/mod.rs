use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs as async_fs;
use tracing::debug;

use crate::address::DEFAULT_API_URL;

const SETTINGS_FILE: &str = "settings.json";

/// Process-wide settings persisted alongside the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Start of the idle window the companion app schedules work into
    #[serde(default = "default_idle_start")]
    pub idle_start_time: String,
    /// End of the idle window
    #[serde(default = "default_idle_end")]
    pub idle_end_time: String,
    /// Base address of the companion app's HTTP API
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_idle_start() -> String {
    "23:00".to_string()
}

fn default_idle_end() -> String {
    "07:00".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idle_start_time: default_idle_start(),
            idle_end_time: default_idle_end(),
            api_url: default_api_url(),
        }
    }
}

/// Loads and saves [`Settings`] from the state directory
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(SETTINGS_FILE),
        }
    }

    /// Read the stored settings. Never fails: a missing or unreadable file
    /// yields the defaults, matching first-run behavior.
    pub async fn load(&self) -> Settings {
        match async_fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                debug!("Unreadable settings file {:?}: {}", self.path, e);
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        async_fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write settings file: {:?}", self.path))?;
        Ok(())
    }
}

/// Default location for the queue and settings files
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idleq")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path());

        let settings = store.load().await;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.idle_start_time, "23:00");
        assert_eq!(settings.idle_end_time, "07:00");
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path());

        let settings = Settings {
            idle_start_time: "22:30".to_string(),
            idle_end_time: "06:00".to_string(),
            api_url: "http://192.168.1.5:8765".to_string(),
        };
        store.save(&settings).await.unwrap();

        assert_eq!(store.load().await, settings);
    }

    #[tokio::test]
    async fn test_partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"api_url": "http://10.0.0.2:8765"}"#).unwrap();

        let store = SettingsStore::new(temp_dir.path());
        let settings = store.load().await;
        assert_eq!(settings.api_url, "http://10.0.0.2:8765");
        assert_eq!(settings.idle_start_time, "23:00");
    }

    #[tokio::test]
    async fn test_corrupt_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(SETTINGS_FILE), "{ nope").unwrap();

        let store = SettingsStore::new(temp_dir.path());
        assert_eq!(store.load().await, Settings::default());
    }
}
