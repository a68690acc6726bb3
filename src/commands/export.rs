use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs as async_fs;
use tracing::info;

use crate::config::SettingsStore;
use crate::queue::QueueStore;
use crate::task::Task;

/// Document written by the export command, shaped so the companion app can
/// import it directly
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub tasks: Vec<Task>,
    pub idle_start_time: String,
    pub idle_end_time: String,
    pub exported_time: String,
}

/// Command to write the queue to a portable JSON file
pub struct ExportCommand {
    state_dir: PathBuf,
    output_dir: PathBuf,
}

impl ExportCommand {
    pub fn new(state_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            state_dir,
            output_dir,
        }
    }

    pub async fn execute(&self) -> Result<PathBuf> {
        let store = QueueStore::new(self.state_dir.clone());
        store.init().await?;
        let settings = SettingsStore::new(&self.state_dir).load().await;

        let tasks = store.load().await?;
        let task_count = tasks.len();
        let now = Utc::now();
        let document = ExportDocument {
            tasks,
            idle_start_time: settings.idle_start_time,
            idle_end_time: settings.idle_end_time,
            exported_time: now.to_rfc3339(),
        };

        // Colons make poor filename characters; dash them out of the stamp
        let filename = format!("idle_queue_{}.json", now.format("%Y-%m-%dT%H-%M-%S"));
        let output_path = self.output_dir.join(filename);

        async_fs::create_dir_all(&self.output_dir).await?;
        let json = serde_json::to_vec_pretty(&document)?;
        async_fs::write(&output_path, json)
            .await
            .with_context(|| format!("Failed to write export file: {:?}", output_path))?;

        info!("✅ Exported {} task(s) to {:?}", task_count, output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ItemData, Platform};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_writes_document_with_settings() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let store = QueueStore::new(temp_dir.path().to_path_buf());
        store.init().await.unwrap();
        let data = ItemData {
            url: Some("https://youtu.be/a".to_string()),
            title: Some("A video".to_string()),
            ..Default::default()
        };
        store
            .append(&Task::build(Platform::Youtube, &data).unwrap())
            .await
            .unwrap();

        let export_cmd =
            ExportCommand::new(temp_dir.path().to_path_buf(), out_dir.path().to_path_buf());
        let output_path = export_cmd.execute().await.unwrap();

        let filename = output_path.file_name().unwrap().to_string_lossy();
        assert!(filename.starts_with("idle_queue_"));
        assert!(filename.ends_with(".json"));
        assert!(!filename.contains(':'));

        let raw = std::fs::read_to_string(&output_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(value["idle_start_time"], "23:00");
        assert_eq!(value["idle_end_time"], "07:00");
        assert!(value["exported_time"].is_string());
    }

    #[tokio::test]
    async fn test_export_empty_queue() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let export_cmd =
            ExportCommand::new(temp_dir.path().to_path_buf(), out_dir.path().to_path_buf());
        let output_path = export_cmd.execute().await.unwrap();

        let raw = std::fs::read_to_string(&output_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["tasks"].as_array().unwrap().len(), 0);
    }
}
