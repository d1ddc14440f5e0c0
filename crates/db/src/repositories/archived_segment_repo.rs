//! Repository for the `archived_segments` cold-storage table.

use sqlx::PgPool;
use uuid::Uuid;

use openskip_core::types::Timestamp;

use crate::models::segment::Segment;

const SEGMENT_COLUMNS: &str = "uuid, video_id, hashed_video_id, service, start_time, \
    end_time, category, action_type, votes, locked, hidden, shadow_hidden, \
    user_id, time_submitted, views, video_duration, user_agent, description, \
    reputation, created_at, updated_at";

/// Archival is one-directional: rows move from `segments` into this table
/// and are never moved back.
pub struct ArchivedSegmentRepo;

impl ArchivedSegmentRepo {
    /// Relocate every live row matching the archival predicate.
    ///
    /// The delete and the insert run as one statement, so a vote landing
    /// between "copy" and "delete" cannot be lost: the row either still
    /// receives it in `segments` or was already carried over whole.
    pub async fn archive_expired(
        pool: &PgPool,
        cutoff: Timestamp,
        vote_limit: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "WITH moved AS (
                DELETE FROM segments
                 WHERE time_submitted < $1 AND votes < $2 AND NOT locked
                 RETURNING uuid, video_id, hashed_video_id, service, start_time,
                           end_time, category, action_type, votes, locked, hidden,
                           shadow_hidden, user_id, time_submitted, views,
                           video_duration, user_agent, description, reputation
            )
            INSERT INTO archived_segments
                (uuid, video_id, hashed_video_id, service, start_time, end_time,
                 category, action_type, votes, locked, hidden, shadow_hidden,
                 user_id, time_submitted, views, video_duration, user_agent,
                 description, reputation)
            SELECT uuid, video_id, hashed_video_id, service, start_time, end_time,
                   category, action_type, votes, locked, hidden, shadow_hidden,
                   user_id, time_submitted, views, video_duration, user_agent,
                   description, reputation
              FROM moved",
        )
        .bind(cutoff)
        .bind(vote_limit)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find an archived segment by its UUID.
    pub async fn find_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {SEGMENT_COLUMNS} FROM archived_segments WHERE uuid = $1");
        sqlx::query_as::<_, Segment>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Total number of archived rows.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM archived_segments")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
