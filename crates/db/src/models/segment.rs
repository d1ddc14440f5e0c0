//! Segment entity model and insert DTO.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use openskip_core::category::{ActionType, Category};
use openskip_core::error::CoreError;
use openskip_core::selection::SegmentView;
use openskip_core::submission::ExistingSegment;
use openskip_core::types::Timestamp;

/// A row from the `segments` table (also the column set of
/// `archived_segments`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub uuid: Uuid,
    pub video_id: String,
    pub hashed_video_id: String,
    pub service: String,
    pub start_time: f64,
    pub end_time: f64,
    pub category: String,
    pub action_type: String,
    pub votes: i32,
    pub locked: bool,
    pub hidden: bool,
    pub shadow_hidden: bool,
    pub user_id: String,
    pub time_submitted: Timestamp,
    pub views: i32,
    pub video_duration: f64,
    pub user_agent: String,
    pub description: String,
    pub reputation: f32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Segment {
    /// Parse the stored classification strings into the closed enums,
    /// rejecting rows with unknown values.
    pub fn classification(&self) -> Result<(Category, ActionType), CoreError> {
        Ok((self.category.parse()?, self.action_type.parse()?))
    }

    /// Project this row into the selection engine's candidate type.
    pub fn to_view(&self) -> Result<SegmentView, CoreError> {
        let (category, action_type) = self.classification()?;
        Ok(SegmentView {
            uuid: self.uuid,
            video_id: self.video_id.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            category,
            action_type,
            votes: self.votes,
            locked: self.locked,
            hidden: self.hidden,
            shadow_hidden: self.shadow_hidden,
            video_duration: self.video_duration,
            time_submitted: self.time_submitted,
            user_id: self.user_id.clone(),
            description: self.description.clone(),
        })
    }

    /// Project this row into the submission validator's existing-segment
    /// type.
    pub fn to_existing(&self) -> Result<ExistingSegment, CoreError> {
        let (category, action_type) = self.classification()?;
        Ok(ExistingSegment {
            start_time: self.start_time,
            end_time: self.end_time,
            category,
            action_type,
            votes: self.votes,
            user_id: self.user_id.clone(),
        })
    }
}

/// DTO for inserting a new segment row.
#[derive(Debug, Clone)]
pub struct NewSegment {
    pub uuid: Uuid,
    pub video_id: String,
    pub hashed_video_id: String,
    pub service: String,
    pub start_time: f64,
    pub end_time: f64,
    pub category: String,
    pub action_type: String,
    pub user_id: String,
    pub video_duration: f64,
    pub user_agent: String,
    pub description: String,
    pub shadow_hidden: bool,
    pub locked: bool,
    pub reputation: f32,
}
