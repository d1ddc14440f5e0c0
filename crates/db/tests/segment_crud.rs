use sqlx::PgPool;
use uuid::Uuid;

use openskip_core::hashing::hash_video_id;
use openskip_core::types::Timestamp;
use openskip_db::models::segment::NewSegment;
use openskip_db::repositories::{ArchivedSegmentRepo, SegmentRepo, VoteRecordRepo};

fn new_segment(video_id: &str, user_id: &str, start: f64, end: f64) -> NewSegment {
    NewSegment {
        uuid: Uuid::new_v4(),
        video_id: video_id.to_string(),
        hashed_video_id: hash_video_id(video_id),
        service: "youtube".to_string(),
        start_time: start,
        end_time: end,
        category: "sponsor".to_string(),
        action_type: "skip".to_string(),
        user_id: user_id.to_string(),
        video_duration: 300.0,
        user_agent: "test-agent".to_string(),
        description: String::new(),
        shadow_hidden: false,
        locked: false,
        reputation: 0.0,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_and_find(pool: PgPool) {
    let input = new_segment("video-a", "user-a", 1.0, 10.0);
    let rows = SegmentRepo::insert_batch(&pool, &[input.clone()]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].votes, 0);
    assert!(!rows[0].locked);
    assert!(!rows[0].hidden);

    let found = SegmentRepo::find_by_uuid(&pool, input.uuid).await.unwrap().unwrap();
    assert_eq!(found.video_id, "video-a");
    assert_eq!(found.category, "sponsor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_live_duplicate_rejected_by_unique_index(pool: PgPool) {
    let first = new_segment("video-a", "user-a", 1.0, 10.0);
    SegmentRepo::insert_batch(&pool, &[first]).await.unwrap();

    let twin = new_segment("video-a", "user-a", 1.0, 10.0);
    let err = SegmentRepo::insert_batch(&pool, &[twin]).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }

    // Exactly one row persisted.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM segments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_batch_leaves_zero_rows(pool: PgPool) {
    let first = new_segment("video-a", "user-a", 1.0, 10.0);
    SegmentRepo::insert_batch(&pool, &[first]).await.unwrap();

    // Second batch: one fresh row plus a duplicate. The whole batch rolls
    // back, so the fresh row must not survive.
    let fresh = new_segment("video-a", "user-a", 50.0, 60.0);
    let twin = new_segment("video-a", "user-a", 1.0, 10.0);
    assert!(SegmentRepo::insert_batch(&pool, &[fresh, twin]).await.is_err());

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM segments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_apply_vote_is_cumulative(pool: PgPool) {
    let input = new_segment("video-a", "user-a", 1.0, 10.0);
    SegmentRepo::insert_batch(&pool, &[input.clone()]).await.unwrap();

    let row = SegmentRepo::apply_vote(&pool, input.uuid, 1, None, None, None)
        .await
        .unwrap();
    assert_eq!(row.votes, 1);

    let row = SegmentRepo::apply_vote(&pool, input.uuid, -2, Some(false), None, None)
        .await
        .unwrap();
    assert_eq!(row.votes, -1);
    assert!(!row.locked);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_vote_record_upsert_round_trip(pool: PgPool) {
    let input = new_segment("video-a", "user-a", 1.0, 10.0);
    SegmentRepo::insert_batch(&pool, &[input.clone()]).await.unwrap();

    assert!(VoteRecordRepo::find(&pool, input.uuid, "voter-1").await.unwrap().is_none());

    VoteRecordRepo::upsert(&pool, input.uuid, "voter-1", 1, 1).await.unwrap();
    let record = VoteRecordRepo::find(&pool, input.uuid, "voter-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.vote_type, 1);
    assert_eq!(record.applied_delta, 1);

    VoteRecordRepo::upsert(&pool, input.uuid, "voter-1", 0, -1).await.unwrap();
    let record = VoteRecordRepo::find(&pool, input.uuid, "voter-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.vote_type, 0);
    assert_eq!(record.applied_delta, -1);

    VoteRecordRepo::delete(&pool, input.uuid, "voter-1").await.unwrap();
    assert!(VoteRecordRepo::find(&pool, input.uuid, "voter-1").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_archive_expired_moves_rows_atomically(pool: PgPool) {
    let old = new_segment("video-a", "user-a", 1.0, 10.0);
    let young = new_segment("video-a", "user-a", 20.0, 30.0);
    SegmentRepo::insert_batch(&pool, &[old.clone(), young.clone()]).await.unwrap();

    // Age the first row past the cutoff and downvote both.
    sqlx::query("UPDATE segments SET time_submitted = now() - interval '30 days' WHERE uuid = $1")
        .bind(old.uuid)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE segments SET votes = -1")
        .execute(&pool)
        .await
        .unwrap();

    let cutoff: Timestamp = chrono::Utc::now() - chrono::Duration::days(20);
    let moved = ArchivedSegmentRepo::archive_expired(&pool, cutoff, 0).await.unwrap();
    assert_eq!(moved, 1);

    assert!(SegmentRepo::find_by_uuid(&pool, old.uuid).await.unwrap().is_none());
    let archived = ArchivedSegmentRepo::find_by_uuid(&pool, old.uuid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(archived.votes, -1);

    // The young row is untouched.
    assert!(SegmentRepo::find_by_uuid(&pool, young.uuid).await.unwrap().is_some());
    assert_eq!(ArchivedSegmentRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_archive_skips_locked_rows(pool: PgPool) {
    let mut input = new_segment("video-a", "user-a", 1.0, 10.0);
    input.locked = true;
    SegmentRepo::insert_batch(&pool, &[input.clone()]).await.unwrap();

    sqlx::query(
        "UPDATE segments SET time_submitted = now() - interval '30 days', votes = -5",
    )
    .execute(&pool)
    .await
    .unwrap();

    let cutoff: Timestamp = chrono::Utc::now() - chrono::Duration::days(20);
    let moved = ArchivedSegmentRepo::archive_expired(&pool, cutoff, 0).await.unwrap();
    assert_eq!(moved, 0);
    assert!(SegmentRepo::find_by_uuid(&pool, input.uuid).await.unwrap().is_some());
}
