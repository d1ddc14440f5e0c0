//! Derivative branding records (titles, thumbnails) and their vote rows.
//!
//! These tables are touched by the moderation cascade only: shadow-banning
//! a user flips `shadow_hidden` on the vote rows of everything that user
//! contributed.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use openskip_core::types::Timestamp;

/// A row from the `titles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Title {
    pub uuid: Uuid,
    pub video_id: String,
    pub hashed_video_id: String,
    pub title: String,
    pub original: bool,
    pub user_id: String,
    pub time_submitted: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `title_votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TitleVote {
    pub uuid: Uuid,
    pub votes: i32,
    pub locked: bool,
    pub shadow_hidden: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `thumbnails` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Thumbnail {
    pub uuid: Uuid,
    pub video_id: String,
    pub hashed_video_id: String,
    pub timestamp_secs: Option<f64>,
    pub original: bool,
    pub user_id: String,
    pub time_submitted: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `thumbnail_votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThumbnailVote {
    pub uuid: Uuid,
    pub votes: i32,
    pub locked: bool,
    pub shadow_hidden: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a title with its vote row.
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub uuid: Uuid,
    pub video_id: String,
    pub hashed_video_id: String,
    pub title: String,
    pub original: bool,
    pub user_id: String,
}

/// DTO for inserting a thumbnail with its vote row.
#[derive(Debug, Clone)]
pub struct NewThumbnail {
    pub uuid: Uuid,
    pub video_id: String,
    pub hashed_video_id: String,
    pub timestamp_secs: Option<f64>,
    pub original: bool,
    pub user_id: String,
}
