//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use openskip_core::category::{ActionType, Category};
use openskip_core::hashing::hash_user_id;
use openskip_db::models::segment::Segment;
use openskip_db::repositories::{SegmentRepo, VipUserRepo};
use openskip_engine::metadata::StaticMetadataSource;
use openskip_engine::state::ServiceState;
use openskip_engine::submission::{
    ProposedSegmentDto, SubmitRequest, SubmissionService, SubmittedSegment,
};

/// Duration the static metadata source reports for the fixture videos.
pub const VIDEO_DURATION: f64 = 300.0;

/// Build a `ServiceState` whose metadata source knows the fixture videos.
pub fn test_state(pool: PgPool) -> ServiceState {
    let metadata = StaticMetadataSource::new()
        .with_video("video-a", VIDEO_DURATION)
        .with_video("video-b", VIDEO_DURATION);
    ServiceState::new(pool, Arc::new(metadata))
}

pub fn skip_dto(start: f64, end: f64, category: Category) -> ProposedSegmentDto {
    ProposedSegmentDto {
        start_time: start,
        end_time: end,
        category,
        action_type: ActionType::Skip,
        description: None,
    }
}

pub fn chapter_dto(start: f64, end: f64, description: &str) -> ProposedSegmentDto {
    ProposedSegmentDto {
        start_time: start,
        end_time: end,
        category: Category::Chapter,
        action_type: ActionType::Chapter,
        description: Some(description.to_string()),
    }
}

pub fn submit_request(
    video_id: &str,
    user_id: &str,
    segments: Vec<ProposedSegmentDto>,
) -> SubmitRequest {
    SubmitRequest {
        video_id: video_id.to_string(),
        service: Default::default(),
        user_id: user_id.to_string(),
        segments,
        video_duration: None,
        user_agent: "test-agent".to_string(),
    }
}

/// Submit one segment and return its response entry.
pub async fn submit_one(
    state: &ServiceState,
    video_id: &str,
    user_id: &str,
    dto: ProposedSegmentDto,
) -> SubmittedSegment {
    SubmissionService::submit(state, &submit_request(video_id, user_id, vec![dto]))
        .await
        .expect("fixture submission should be accepted")
        .remove(0)
}

/// Grant VIP to a private user ID; returns the stored public ID.
pub async fn make_vip(pool: &PgPool, user_id: &str) -> String {
    let public = hash_user_id(user_id);
    VipUserRepo::add(pool, &public).await.unwrap();
    public
}

pub async fn segment_row(pool: &PgPool, uuid: Uuid) -> Segment {
    SegmentRepo::find_by_uuid(pool, uuid)
        .await
        .unwrap()
        .expect("segment row should exist")
}

/// Give an ordinary user vote eligibility in a category by having them
/// submit a live segment on another video.
pub async fn make_eligible(state: &ServiceState, user_id: &str, category: Category) {
    submit_one(state, "video-b", user_id, skip_dto(100.0, 120.0, category)).await;
}
