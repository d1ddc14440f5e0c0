//! Repository for the `vote_records` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vote_record::VoteRecord;

const RECORD_COLUMNS: &str =
    "id, segment_uuid, user_id, vote_type, applied_delta, created_at, updated_at";

/// One row per (segment, user): prevents double counting and lets undo
/// revert the exact recorded delta.
pub struct VoteRecordRepo;

impl VoteRecordRepo {
    /// The user's current vote on a segment, if any.
    pub async fn find(
        pool: &PgPool,
        segment_uuid: Uuid,
        user_id: &str,
    ) -> Result<Option<VoteRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM vote_records
             WHERE segment_uuid = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, VoteRecord>(&query)
            .bind(segment_uuid)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Store or replace the user's vote on a segment.
    pub async fn upsert(
        pool: &PgPool,
        segment_uuid: Uuid,
        user_id: &str,
        vote_type: i16,
        applied_delta: i32,
    ) -> Result<VoteRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO vote_records (segment_uuid, user_id, vote_type, applied_delta)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (segment_uuid, user_id) DO UPDATE
                SET vote_type = EXCLUDED.vote_type,
                    applied_delta = EXCLUDED.applied_delta,
                    updated_at = now()
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, VoteRecord>(&query)
            .bind(segment_uuid)
            .bind(user_id)
            .bind(vote_type)
            .bind(applied_delta)
            .fetch_one(pool)
            .await
    }

    /// Remove the user's vote on a segment (undo).
    pub async fn delete(
        pool: &PgPool,
        segment_uuid: Uuid,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM vote_records WHERE segment_uuid = $1 AND user_id = $2")
            .bind(segment_uuid)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
