use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Platforms whose media items can be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Twitter,
    Bilibili,
}

impl Platform {
    /// Tag prepended to the display title of every task
    pub fn title_prefix(&self) -> &'static str {
        match self {
            Platform::Youtube => "Video",
            Platform::Twitter => "Twitter",
            Platform::Bilibili => "Bilibili",
        }
    }

    /// Infer the platform from a media URL's host, if it belongs to a
    /// supported site. Returns `None` for unrecognized hosts so the caller
    /// can ask for an explicit platform instead of guessing.
    pub fn from_url(raw: &str) -> Option<Platform> {
        let parsed = Url::parse(raw).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        match host {
            "youtu.be" => Some(Platform::Youtube),
            "twitter.com" | "x.com" => Some(Platform::Twitter),
            "bilibili.com" | "b23.tv" => Some(Platform::Bilibili),
            h if h == "youtube.com" || h.ends_with(".youtube.com") => Some(Platform::Youtube),
            h if h.ends_with(".bilibili.com") => Some(Platform::Bilibili),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Youtube => "youtube",
            Platform::Twitter => "twitter",
            Platform::Bilibili => "bilibili",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Platform {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "youtube" => Ok(Platform::Youtube),
            "twitter" => Ok(Platform::Twitter),
            "bilibili" => Ok(Platform::Bilibili),
            _ => Err(BuildError::UnsupportedPlatform(s.to_string())),
        }
    }
}

/// Why a task could not be constructed from the caller's input
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
    #[error("missing required field '{field}' for {platform} tasks")]
    MissingField {
        platform: Platform,
        field: &'static str,
    },
}

/// Loosely-typed item fields handed over by the caller (browser glue, CLI
/// flags). Which fields are required depends on the platform; the builder
/// checks before constructing anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemData {
    pub url: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub text: Option<String>,
    pub uploader: Option<String>,
    pub video_id: Option<String>,
}

/// Processing defaults stamped onto every task. Opaque pass-through
/// configuration for the downstream worker; this crate never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub whisper_model_size: String,
    pub stream: bool,
    pub summary_dir: String,
    pub download_video: bool,
    pub custom_prompt: Option<String>,
    pub template_path: Option<String>,
    pub generate_subtitles: bool,
    pub translate_to_chinese: bool,
    pub embed_subtitles: bool,
    pub cookies_file: Option<String>,
    pub enable_transcription: bool,
    pub generate_article: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            whisper_model_size: "small".to_string(),
            stream: true,
            summary_dir: "summaries".to_string(),
            download_video: true,
            custom_prompt: None,
            template_path: None,
            generate_subtitles: true,
            translate_to_chinese: false,
            embed_subtitles: true,
            cookies_file: None,
            enable_transcription: false,
            generate_article: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeParams {
    pub youtube_url: String,
    #[serde(flatten)]
    pub options: ProcessingOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterParams {
    pub url: String,
    pub author: String,
    pub text: String,
    #[serde(flatten)]
    pub options: ProcessingOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilibiliParams {
    pub url: String,
    pub uploader: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(flatten)]
    pub options: ProcessingOptions,
}

/// Per-platform task payload, discriminated by the serialized `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum TaskParams {
    Youtube(YoutubeParams),
    Twitter(TwitterParams),
    Bilibili(BilibiliParams),
}

/// A queued description of a media item to be processed by the companion app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub params: TaskParams,
    pub title: String,
    #[serde(rename = "addedTime")]
    pub added_time: String,
    pub platform: Platform,
}

impl Task {
    /// Build a canonical task from the caller's loosely-typed item data.
    /// Fails when a field the platform requires is absent.
    pub fn build(platform: Platform, data: &ItemData) -> Result<Task, BuildError> {
        let url = required(platform, data.url.as_deref(), "url")?;
        let title = required(platform, data.title.as_deref(), "title")?;
        let options = ProcessingOptions::default();

        let params = match platform {
            Platform::Youtube => TaskParams::Youtube(YoutubeParams {
                youtube_url: url.to_string(),
                options,
            }),
            Platform::Twitter => TaskParams::Twitter(TwitterParams {
                url: url.to_string(),
                author: required(platform, data.author.as_deref(), "author")?.to_string(),
                text: required(platform, data.text.as_deref(), "text")?.to_string(),
                options,
            }),
            Platform::Bilibili => TaskParams::Bilibili(BilibiliParams {
                url: url.to_string(),
                uploader: required(platform, data.uploader.as_deref(), "uploader")?.to_string(),
                video_id: required(platform, data.video_id.as_deref(), "video_id")?.to_string(),
                options,
            }),
        };

        Ok(Task {
            params,
            title: format!("{}: {}", platform.title_prefix(), title),
            added_time: Utc::now().to_rfc3339(),
            platform,
        })
    }

    /// Canonical identity field used for duplicate detection: the primary
    /// source URL, whatever the platform calls it.
    pub fn source_url(&self) -> &str {
        match &self.params {
            TaskParams::Youtube(p) => &p.youtube_url,
            TaskParams::Twitter(p) => &p.url,
            TaskParams::Bilibili(p) => &p.url,
        }
    }

    /// Creation timestamp, if it still parses. Only the eviction sweep cares.
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.added_time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

fn required<'a>(
    platform: Platform,
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, BuildError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(BuildError::MissingField { platform, field }),
    }
}
