mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use openskip_core::category::{Category, Service};
use openskip_core::error::CoreError;
use openskip_core::hashing::hash_video_id;
use openskip_core::selection::SelectionFilter;
use openskip_engine::error::EngineError;
use openskip_engine::selection::SelectionService;
use openskip_engine::vote::{VoteRequest, VoteService};

use common::*;

#[sqlx::test(migrations = "../db/migrations")]
async fn read_returns_resolved_segments_in_start_order(pool: PgPool) {
    let state = test_state(pool.clone());

    submit_one(&state, "video-a", "user-u", skip_dto(40.0, 50.0, Category::Sponsor)).await;
    submit_one(&state, "video-a", "user-u", skip_dto(1.0, 10.0, Category::Intro)).await;

    let segments = SelectionService::segments_for_video(
        &state,
        "video-a",
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].category, Category::Intro);
    assert_eq!(segments[1].category, Category::Sponsor);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nothing_matching_reports_not_found(pool: PgPool) {
    let state = test_state(pool.clone());

    let err = SelectionService::segments_for_video(
        &state,
        "video-a",
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound(_)));
    assert_eq!(err.http_status(), 404);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dead_segments_disappear_from_reads(pool: PgPool) {
    let state = test_state(pool.clone());

    let submitted = submit_one(
        &state,
        "video-a",
        "user-u",
        skip_dto(1.0, 10.0, Category::Sponsor),
    )
    .await;

    // The owner's downvote retires the segment.
    VoteService::vote(
        &state,
        &VoteRequest {
            uuid: submitted.uuid,
            user_id: "user-u".to_string(),
            vote_type: 0,
            video_duration: None,
        },
    )
    .await
    .unwrap();

    let err = SelectionService::segments_for_video(
        &state,
        "video-a",
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn hash_prefix_query_groups_per_video(pool: PgPool) {
    let state = test_state(pool.clone());

    submit_one(&state, "video-a", "user-u", skip_dto(1.0, 10.0, Category::Sponsor)).await;
    submit_one(&state, "video-b", "user-u", skip_dto(5.0, 15.0, Category::Sponsor)).await;

    let prefix = &hash_video_id("video-a")[..4];
    let groups = SelectionService::segments_by_hash_prefix(
        &state,
        prefix,
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap();

    // At minimum video-a matches its own prefix; every group carries its
    // full hash and at least one segment.
    assert!(groups.iter().any(|g| g.video_id == "video-a"));
    for group in &groups {
        assert!(group.hashed_video_id.starts_with(prefix));
        assert!(!group.segments.is_empty());
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn hash_prefix_queries_are_idempotent(pool: PgPool) {
    let state = test_state(pool.clone());

    submit_one(&state, "video-a", "user-u", skip_dto(1.0, 10.0, Category::Sponsor)).await;
    submit_one(&state, "video-a", "user-v", skip_dto(5.0, 15.0, Category::Sponsor)).await;
    submit_one(&state, "video-a", "user-u", skip_dto(30.0, 40.0, Category::Intro)).await;

    let prefix = &hash_video_id("video-a")[..6];
    let first = SelectionService::segments_by_hash_prefix(
        &state,
        prefix,
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap();
    let second = SelectionService::segments_by_hash_prefix(
        &state,
        prefix,
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap();

    let flatten = |groups: &[openskip_engine::selection::VideoSegments]| {
        groups
            .iter()
            .flat_map(|g| g.segments.iter().map(|s| s.uuid))
            .collect::<Vec<_>>()
    };
    assert_eq!(flatten(&first), flatten(&second));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_hash_prefix_is_rejected(pool: PgPool) {
    let state = test_state(pool.clone());

    let err = SelectionService::segments_by_hash_prefix(
        &state,
        "xyz",
        Service::Youtube,
        &SelectionFilter::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.http_status(), 400);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn counts_are_cached_and_refused_under_load(pool: PgPool) {
    let state = test_state(pool.clone());

    submit_one(&state, "video-a", "user-u", skip_dto(1.0, 10.0, Category::Sponsor)).await;

    let count = SelectionService::visible_segment_count(&state, "video-a", Service::Youtube)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // Cached value survives high-load mode.
    state.set_high_load(true);
    let count = SelectionService::visible_segment_count(&state, "video-a", Service::Youtube)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // A cache miss under load is refused rather than read fresh.
    let err = SelectionService::visible_segment_count(&state, "video-z", Service::Youtube)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Overloaded));
    assert_eq!(err.http_status(), 503);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn representative_segment_is_the_oldest_visible(pool: PgPool) {
    let state = test_state(pool.clone());

    let first = submit_one(&state, "video-a", "user-u", skip_dto(1.0, 10.0, Category::Sponsor)).await;
    submit_one(&state, "video-a", "user-v", skip_dto(20.0, 30.0, Category::Sponsor)).await;

    // Make submission order unambiguous.
    sqlx::query("UPDATE segments SET time_submitted = now() - interval '1 hour' WHERE uuid = $1")
        .bind(first.uuid)
        .execute(&pool)
        .await
        .unwrap();

    let representative =
        SelectionService::representative_segment(&state, "video-a", Service::Youtube)
            .await
            .unwrap();
    assert_eq!(representative.uuid, first.uuid);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn mark_viewed_bumps_the_counter(pool: PgPool) {
    let state = test_state(pool.clone());

    let submitted = submit_one(
        &state,
        "video-a",
        "user-u",
        skip_dto(1.0, 10.0, Category::Sponsor),
    )
    .await;

    SelectionService::mark_viewed(&state, submitted.uuid).await.unwrap();
    SelectionService::mark_viewed(&state, submitted.uuid).await.unwrap();
    assert_eq!(segment_row(&pool, submitted.uuid).await.views, 2);

    let err = SelectionService::mark_viewed(&state, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
}
