use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::address;
use crate::config::SettingsStore;
use crate::queue::{self, QueueStore};
use crate::task::{ItemData, Platform, Task, TaskParams};

/// Hard ceiling on a single delivery attempt
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single enqueue request
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueResult {
    /// Companion app accepted the task; it is also persisted locally
    Delivered { queue_length: usize },
    /// Companion app unreachable or refused; the task is kept locally and
    /// `reason` says why delivery did not happen
    QueuedLocally { queue_length: usize, reason: String },
    /// A task with the same source URL is already queued; nothing changed
    Duplicate,
    /// Input failed validation; nothing was queued
    Rejected { reason: String },
}

/// Wire body for `POST {base}/api/queue/add`
#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    platform: Platform,
    url: &'a str,
    title: String,
    #[serde(rename = "videoId", skip_serializing_if = "Option::is_none")]
    video_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uploader: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AddReply {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

/// Hands tasks to the companion app over HTTP, falling back to the local
/// queue when it is unreachable.
///
/// The local append happens on every non-duplicate, non-rejected path:
/// remote delivery is a best-effort notification, never a precondition for
/// retaining the user's request.
pub struct SyncEngine {
    store: QueueStore,
    settings: SettingsStore,
    client: Client,
    timeout: Duration,
    title_prefix: Regex,
}

impl SyncEngine {
    pub fn new(store: QueueStore, settings: SettingsStore) -> Self {
        Self::with_timeout(store, settings, REMOTE_TIMEOUT)
    }

    /// Same engine with a custom delivery deadline
    pub fn with_timeout(store: QueueStore, settings: SettingsStore, timeout: Duration) -> Self {
        let client = Client::new();
        let title_prefix =
            Regex::new(r"^(Video|Twitter|Bilibili): ").expect("valid title prefix pattern");
        Self {
            store,
            settings,
            client,
            timeout,
            title_prefix,
        }
    }

    /// Build, deduplicate, deliver, persist.
    ///
    /// Returns `Err` only when the local store itself fails; every remote
    /// failure is absorbed into [`EnqueueResult::QueuedLocally`].
    pub async fn enqueue(&self, platform: Platform, data: &ItemData) -> Result<EnqueueResult> {
        let task = match Task::build(platform, data) {
            Ok(task) => task,
            Err(e) => {
                return Ok(EnqueueResult::Rejected {
                    reason: e.to_string(),
                })
            }
        };

        // Hold the single mutation slot across the dedup check and the
        // append, so two concurrent enqueues of the same URL cannot both
        // pass the check.
        let _slot = self.store.lock_mutations().await;

        let tasks = self.store.load().await?;
        if queue::find_in(&tasks, task.source_url()).is_some() {
            debug!("Task already queued: {}", task.source_url());
            return Ok(EnqueueResult::Duplicate);
        }

        let base = self.remote_address().await;
        let delivery = self.deliver(&base, &task).await;

        let queue_length = self.store.append_unlocked(&task).await?;

        Ok(match delivery {
            Ok(()) => {
                info!("Delivered task to companion app: {}", task.source_url());
                EnqueueResult::Delivered { queue_length }
            }
            Err(reason) => {
                debug!("Delivery failed ({}), queued locally", reason);
                EnqueueResult::QueuedLocally {
                    queue_length,
                    reason,
                }
            }
        })
    }

    /// Load settings and normalize the stored address, rewriting the stored
    /// value when normalization changed it (self-healing configuration).
    async fn remote_address(&self) -> String {
        let mut settings = self.settings.load().await;
        let normalized = address::normalize(&settings.api_url);
        if normalized != settings.api_url {
            info!("Normalized companion app address: {}", normalized);
            settings.api_url = normalized.clone();
            if let Err(e) = self.settings.save(&settings).await {
                warn!("Failed to persist normalized address: {}", e);
            }
        }
        normalized
    }

    /// Best-effort notification of the companion app. `Err` carries the
    /// human-readable cause for the caller's warning text.
    async fn deliver(&self, base: &str, task: &Task) -> Result<(), String> {
        let endpoint = format!("{base}/api/queue/add");
        let body = self.add_request(task);
        debug!("Delivering task to {}", endpoint);

        let attempt = async {
            let response = self
                .client
                .post(&endpoint)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() {
                        "cannot reach the companion app; is it running?".to_string()
                    } else {
                        format!("request failed: {e}")
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!("companion app answered HTTP {status}"));
            }

            let reply: AddReply = response
                .json()
                .await
                .map_err(|e| format!("invalid response payload: {e}"))?;
            if reply.success {
                Ok(())
            } else {
                Err(reply
                    .error
                    .unwrap_or_else(|| "companion app reported an error".to_string()))
            }
        };

        // Race the whole exchange against the deadline. A request still in
        // flight when the deadline fires is abandoned and its result
        // discarded.
        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => Err(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            )),
        }
    }

    fn add_request<'a>(&self, task: &'a Task) -> AddRequest<'a> {
        let title = self.title_prefix.replace(&task.title, "").into_owned();
        let (video_id, uploader, author, text) = match &task.params {
            TaskParams::Youtube(_) => (None, None, None, None),
            TaskParams::Twitter(p) => (None, None, Some(p.author.as_str()), Some(p.text.as_str())),
            TaskParams::Bilibili(p) => {
                (Some(p.video_id.as_str()), Some(p.uploader.as_str()), None, None)
            }
        };

        AddRequest {
            platform: task.platform,
            url: task.source_url(),
            title,
            video_id,
            uploader,
            author,
            text,
        }
    }
}
