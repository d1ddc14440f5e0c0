//! Video metadata lookup.
//!
//! The engine treats video metadata as an external collaborator behind a
//! narrow trait. Lookups on the submission path are best-effort: a failed
//! lookup falls back to the client-supplied duration.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use openskip_core::types::Timestamp;

/// Metadata for one video as reported by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub duration_secs: f64,
    pub title: String,
    pub channel_id: String,
    pub published_at: Option<Timestamp>,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("video not found")]
    NotFound,

    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed metadata response: {0}")]
    Malformed(String),
}

/// Duration/title lookup by external video ID.
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    async fn lookup(&self, video_id: &str) -> Result<VideoMetadata, MetadataError>;
}

/// Production adapter: JSON lookup against a metadata service.
pub struct HttpMetadataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetadataSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpMetadataSource {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build from the `VIDEO_METADATA_URL` environment variable.
    pub fn from_env() -> Option<Self> {
        std::env::var("VIDEO_METADATA_URL").ok().map(Self::new)
    }
}

#[async_trait]
impl VideoMetadataSource for HttpMetadataSource {
    async fn lookup(&self, video_id: &str) -> Result<VideoMetadata, MetadataError> {
        let url = format!("{}/videos/{video_id}", self.base_url.trim_end_matches('/'));
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound);
        }
        let response = response.error_for_status()?;
        let metadata: VideoMetadata = response.json().await?;

        if !metadata.duration_secs.is_finite() || metadata.duration_secs < 0.0 {
            return Err(MetadataError::Malformed(format!(
                "invalid duration {}",
                metadata.duration_secs
            )));
        }
        Ok(metadata)
    }
}

/// Fixed in-memory source for tests and offline runs.
#[derive(Debug, Default)]
pub struct StaticMetadataSource {
    entries: HashMap<String, VideoMetadata>,
}

impl StaticMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, video_id: impl Into<String>, duration_secs: f64) -> Self {
        let video_id = video_id.into();
        self.entries.insert(
            video_id.clone(),
            VideoMetadata {
                duration_secs,
                title: format!("Video {video_id}"),
                channel_id: "channel".to_string(),
                published_at: None,
            },
        );
        self
    }
}

#[async_trait]
impl VideoMetadataSource for StaticMetadataSource {
    async fn lookup(&self, video_id: &str) -> Result<VideoMetadata, MetadataError> {
        self.entries
            .get(video_id)
            .cloned()
            .ok_or(MetadataError::NotFound)
    }
}
