//! Repository for the `segments` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::segment::{NewSegment, Segment};

/// Column list for segments queries.
const SEGMENT_COLUMNS: &str = "uuid, video_id, hashed_video_id, service, start_time, \
    end_time, category, action_type, votes, locked, hidden, shadow_hidden, \
    user_id, time_submitted, views, video_duration, user_agent, description, \
    reputation, created_at, updated_at";

/// Provides CRUD and vote/moderation mutations for segment rows.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Insert a batch of segments in one transaction. A rejected batch
    /// must leave zero rows, so all-or-nothing semantics are required.
    pub async fn insert_batch(
        pool: &PgPool,
        inputs: &[NewSegment],
    ) -> Result<Vec<Segment>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            rows.push(Self::insert_inner(&mut tx, input).await?);
        }
        tx.commit().await?;
        Ok(rows)
    }

    pub async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewSegment,
    ) -> Result<Segment, sqlx::Error> {
        let query = format!(
            "INSERT INTO segments
                (uuid, video_id, hashed_video_id, service, start_time, end_time,
                 category, action_type, user_id, video_duration, user_agent,
                 description, shadow_hidden, locked, reputation)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {SEGMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(input.uuid)
            .bind(&input.video_id)
            .bind(&input.hashed_video_id)
            .bind(&input.service)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.category)
            .bind(&input.action_type)
            .bind(&input.user_id)
            .bind(input.video_duration)
            .bind(&input.user_agent)
            .bind(&input.description)
            .bind(input.shadow_hidden)
            .bind(input.locked)
            .bind(input.reputation)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a segment by its UUID.
    pub async fn find_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {SEGMENT_COLUMNS} FROM segments WHERE uuid = $1");
        sqlx::query_as::<_, Segment>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// List every row stored for a video, live or not, ordered by start
    /// time. Visibility filtering happens in the selection engine.
    pub async fn list_for_video(
        pool: &PgPool,
        video_id: &str,
        service: &str,
    ) -> Result<Vec<Segment>, sqlx::Error> {
        let query = format!(
            "SELECT {SEGMENT_COLUMNS} FROM segments
             WHERE video_id = $1 AND service = $2
             ORDER BY start_time ASC, uuid ASC"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(video_id)
            .bind(service)
            .fetch_all(pool)
            .await
    }

    /// List rows for every video whose hashed ID starts with the given
    /// (already validated, lowercase hex) prefix.
    pub async fn list_by_hash_prefix(
        pool: &PgPool,
        prefix: &str,
        service: &str,
    ) -> Result<Vec<Segment>, sqlx::Error> {
        let query = format!(
            "SELECT {SEGMENT_COLUMNS} FROM segments
             WHERE hashed_video_id LIKE $1 || '%' AND service = $2
             ORDER BY video_id ASC, start_time ASC, uuid ASC"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(prefix)
            .bind(service)
            .fetch_all(pool)
            .await
    }

    /// Apply one evaluated vote outcome as a single read-modify-write
    /// statement: the vote delta plus any lock/hide/duration side effects.
    pub async fn apply_vote(
        pool: &PgPool,
        uuid: Uuid,
        vote_delta: i32,
        set_locked: Option<bool>,
        set_hidden: Option<bool>,
        set_video_duration: Option<f64>,
    ) -> Result<Segment, sqlx::Error> {
        let query = format!(
            "UPDATE segments SET
                votes = votes + $2,
                locked = COALESCE($3, locked),
                hidden = COALESCE($4, hidden),
                video_duration = COALESCE($5, video_duration),
                updated_at = now()
             WHERE uuid = $1
             RETURNING {SEGMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(uuid)
            .bind(vote_delta)
            .bind(set_locked)
            .bind(set_hidden)
            .bind(set_video_duration)
            .fetch_one(pool)
            .await
    }

    /// Change a segment's effective category.
    pub async fn set_category(
        pool: &PgPool,
        uuid: Uuid,
        category: &str,
    ) -> Result<Segment, sqlx::Error> {
        let query = format!(
            "UPDATE segments SET category = $2, updated_at = now()
             WHERE uuid = $1
             RETURNING {SEGMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(uuid)
            .bind(category)
            .fetch_one(pool)
            .await
    }

    /// Record one served view. Returns how many rows matched.
    pub async fn increment_views(pool: &PgPool, uuid: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE segments SET views = views + 1, updated_at = now() WHERE uuid = $1")
                .bind(uuid)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Count live, visible segments for a video (advisory cache feed).
    pub async fn count_visible_for_video(
        pool: &PgPool,
        video_id: &str,
        service: &str,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM segments
             WHERE video_id = $1 AND service = $2
               AND votes > -2 AND NOT hidden AND NOT shadow_hidden",
        )
        .bind(video_id)
        .bind(service)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Whether the user has a live, visible submission in the category.
    pub async fn user_has_live_in_category(
        pool: &PgPool,
        user_id: &str,
        category: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM segments
                WHERE user_id = $1 AND category = $2
                  AND votes > -2 AND NOT hidden AND NOT shadow_hidden
            )",
        )
        .bind(user_id)
        .bind(category)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Whether the user has a live, visible submission in the category
    /// with the given action type (full-video vote eligibility).
    pub async fn user_has_live_with_action(
        pool: &PgPool,
        user_id: &str,
        category: &str,
        action_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM segments
                WHERE user_id = $1 AND category = $2 AND action_type = $3
                  AND votes > -2 AND NOT hidden AND NOT shadow_hidden
            )",
        )
        .bind(user_id)
        .bind(category)
        .bind(action_type)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Whether the user has submitted at least one chapter (malicious
    /// report eligibility).
    pub async fn user_has_chapter_submission(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM segments
                WHERE user_id = $1 AND action_type = 'chapter'
            )",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Hide all live non-full segments of a video after a duration
    /// correction. Full-video segments are exempt.
    pub async fn hide_non_full_for_video_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        video_id: &str,
        service: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE segments SET hidden = TRUE, updated_at = now()
             WHERE video_id = $1 AND service = $2
               AND action_type != 'full' AND votes > -2 AND NOT hidden",
        )
        .bind(video_id)
        .bind(service)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flip `shadow_hidden` on a user's segments inside a moderation
    /// cascade. Locked rows are always excluded; an optional category
    /// scope limits the flip.
    pub async fn set_shadow_hidden_for_user_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: &str,
        shadow_hidden: bool,
        categories: Option<&[String]>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE segments SET shadow_hidden = $2, updated_at = now()
             WHERE user_id = $1 AND NOT locked
               AND ($3::text[] IS NULL OR category = ANY($3))",
        )
        .bind(user_id)
        .bind(shadow_hidden)
        .bind(categories)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
