use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address;
use crate::config::SettingsStore;

/// Bound on a single connection probe
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of probing the companion app, for status display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthReply {
    message: Option<String>,
    timestamp: Option<String>,
}

/// Probes the companion app's health endpoint, independently of task
/// delivery. Never touches the queue.
pub struct HealthMonitor {
    settings: SettingsStore,
    client: Client,
}

impl HealthMonitor {
    pub fn new(settings: SettingsStore) -> Self {
        let client = Client::builder()
            .timeout(HEALTH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self { settings, client }
    }

    /// One probe of `GET {base}/api/health`. Any 2xx answer counts as
    /// healthy; everything else is reported as disconnected with an
    /// explanatory message.
    pub async fn check(&self) -> ConnectionStatus {
        let settings = self.settings.load().await;
        let base = address::normalize(&settings.api_url);
        let endpoint = format!("{base}/api/health");
        debug!("Probing companion app at {}", endpoint);

        let response = match self.client.get(&endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    "companion app did not answer in time".to_string()
                } else {
                    "cannot reach the companion app; is it running?".to_string()
                };
                return ConnectionStatus {
                    connected: false,
                    message,
                    timestamp: None,
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ConnectionStatus {
                connected: false,
                message: format!("companion app answered HTTP {status}"),
                timestamp: None,
            };
        }

        let reply = response.json::<HealthReply>().await.unwrap_or(HealthReply {
            message: None,
            timestamp: None,
        });
        ConnectionStatus {
            connected: true,
            message: reply
                .message
                .unwrap_or_else(|| "companion app is running".to_string()),
            timestamp: reply.timestamp,
        }
    }
}
