use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::SettingsStore;
use crate::queue::QueueStore;
use crate::sync::{EnqueueResult, SyncEngine};
use crate::task::{ItemData, Platform};

/// Command to queue a single media item
pub struct AddCommand {
    url: String,
    title: String,
    platform: Option<Platform>,
    author: Option<String>,
    text: Option<String>,
    uploader: Option<String>,
    video_id: Option<String>,
    state_dir: PathBuf,
}

impl AddCommand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: String,
        title: String,
        platform: Option<Platform>,
        author: Option<String>,
        text: Option<String>,
        uploader: Option<String>,
        video_id: Option<String>,
        state_dir: PathBuf,
    ) -> Self {
        Self {
            url,
            title,
            platform,
            author,
            text,
            uploader,
            video_id,
            state_dir,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let platform = match self.platform {
            Some(platform) => platform,
            None => Platform::from_url(&self.url).ok_or_else(|| {
                anyhow!(
                    "Unable to infer a platform from '{}'. Pass --platform explicitly.",
                    self.url
                )
            })?,
        };

        let store = QueueStore::new(self.state_dir.clone());
        store.init().await?;
        let settings = SettingsStore::new(&self.state_dir);
        let engine = SyncEngine::new(store, settings);

        let data = ItemData {
            url: Some(self.url.clone()),
            title: Some(self.title.clone()),
            author: self.author.clone(),
            text: self.text.clone(),
            uploader: self.uploader.clone(),
            video_id: self.video_id.clone(),
        };

        match engine.enqueue(platform, &data).await? {
            EnqueueResult::Delivered { queue_length } => {
                info!(
                    "✅ Added to the companion app queue ({} task(s) queued locally)",
                    queue_length
                );
            }
            EnqueueResult::QueuedLocally {
                queue_length,
                reason,
            } => {
                warn!("⚠️ Could not notify the companion app: {}", reason);
                info!(
                    "✅ Kept in the local queue for later ({} task(s) queued)",
                    queue_length
                );
            }
            EnqueueResult::Duplicate => {
                warn!("⚠️ This item is already in the queue.");
                info!("✅ No action needed.");
            }
            EnqueueResult::Rejected { reason } => {
                return Err(anyhow!("Invalid item: {}", reason));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::task::Task;
    use tempfile::TempDir;

    async fn point_at_unreachable(state_dir: &std::path::Path) {
        let settings = SettingsStore::new(state_dir);
        settings
            .save(&Settings {
                api_url: "http://127.0.0.1:1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_with_inferred_platform() {
        let temp_dir = TempDir::new().unwrap();
        point_at_unreachable(temp_dir.path()).await;

        let add_cmd = AddCommand::new(
            "https://youtube.com/watch?v=abc".to_string(),
            "Some talk".to_string(),
            None,
            None,
            None,
            None,
            None,
            temp_dir.path().to_path_buf(),
        );
        add_cmd.execute().await.unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join("queue.json")).unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].platform, Platform::Youtube);
        assert_eq!(tasks[0].source_url(), "https://youtube.com/watch?v=abc");
    }

    #[tokio::test]
    async fn test_add_unrecognized_host_needs_explicit_platform() {
        let temp_dir = TempDir::new().unwrap();
        point_at_unreachable(temp_dir.path()).await;

        let add_cmd = AddCommand::new(
            "https://example.com/video/1".to_string(),
            "A video".to_string(),
            None,
            None,
            None,
            None,
            None,
            temp_dir.path().to_path_buf(),
        );

        let result = add_cmd.execute().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unable to infer a platform"));
    }

    #[tokio::test]
    async fn test_add_twitter_without_author_fails() {
        let temp_dir = TempDir::new().unwrap();
        point_at_unreachable(temp_dir.path()).await;

        let add_cmd = AddCommand::new(
            "https://x.com/u/status/1".to_string(),
            "A post".to_string(),
            None,
            None,
            None,
            None,
            None,
            temp_dir.path().to_path_buf(),
        );

        let result = add_cmd.execute().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("author"));
    }
}
