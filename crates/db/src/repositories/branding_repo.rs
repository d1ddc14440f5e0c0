//! Repository for derivative branding records (titles, thumbnails) and
//! their vote rows.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::branding::{NewThumbnail, NewTitle, Thumbnail, ThumbnailVote, Title, TitleVote};

const TITLE_COLUMNS: &str = "uuid, video_id, hashed_video_id, title, original, user_id, \
    time_submitted, created_at, updated_at";
const THUMBNAIL_COLUMNS: &str = "uuid, video_id, hashed_video_id, timestamp_secs, original, \
    user_id, time_submitted, created_at, updated_at";
const VOTE_COLUMNS: &str = "uuid, votes, locked, shadow_hidden, created_at, updated_at";

/// Titles and thumbnails are owned by submitters like segments are; the
/// moderation cascade flips their vote rows' `shadow_hidden` by ownership.
pub struct BrandingRepo;

impl BrandingRepo {
    /// Insert a title together with its zeroed vote row.
    pub async fn insert_title(pool: &PgPool, input: &NewTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO titles (uuid, video_id, hashed_video_id, title, original, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TITLE_COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(input.uuid)
            .bind(&input.video_id)
            .bind(&input.hashed_video_id)
            .bind(&input.title)
            .bind(input.original)
            .bind(&input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO title_votes (uuid) VALUES ($1)")
            .bind(input.uuid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(title)
    }

    /// Insert a thumbnail together with its zeroed vote row.
    pub async fn insert_thumbnail(
        pool: &PgPool,
        input: &NewThumbnail,
    ) -> Result<Thumbnail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO thumbnails
                (uuid, video_id, hashed_video_id, timestamp_secs, original, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {THUMBNAIL_COLUMNS}"
        );
        let thumbnail = sqlx::query_as::<_, Thumbnail>(&query)
            .bind(input.uuid)
            .bind(&input.video_id)
            .bind(&input.hashed_video_id)
            .bind(input.timestamp_secs)
            .bind(input.original)
            .bind(&input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO thumbnail_votes (uuid) VALUES ($1)")
            .bind(input.uuid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(thumbnail)
    }

    pub async fn title_vote(pool: &PgPool, uuid: Uuid) -> Result<Option<TitleVote>, sqlx::Error> {
        let query = format!("SELECT {VOTE_COLUMNS} FROM title_votes WHERE uuid = $1");
        sqlx::query_as::<_, TitleVote>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    pub async fn thumbnail_vote(
        pool: &PgPool,
        uuid: Uuid,
    ) -> Result<Option<ThumbnailVote>, sqlx::Error> {
        let query = format!("SELECT {VOTE_COLUMNS} FROM thumbnail_votes WHERE uuid = $1");
        sqlx::query_as::<_, ThumbnailVote>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Flip `shadow_hidden` on the title votes of everything a user
    /// submitted. Locked rows are excluded, as in the segment cascade.
    pub async fn set_title_shadow_hidden_for_user_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: &str,
        shadow_hidden: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE title_votes tv SET shadow_hidden = $2, updated_at = now()
             FROM titles t
             WHERE t.uuid = tv.uuid AND t.user_id = $1 AND NOT tv.locked",
        )
        .bind(user_id)
        .bind(shadow_hidden)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flip `shadow_hidden` on the thumbnail votes of everything a user
    /// submitted. Locked rows are excluded.
    pub async fn set_thumbnail_shadow_hidden_for_user_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: &str,
        shadow_hidden: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE thumbnail_votes tv SET shadow_hidden = $2, updated_at = now()
             FROM thumbnails t
             WHERE t.uuid = tv.uuid AND t.user_id = $1 AND NOT tv.locked",
        )
        .bind(user_id)
        .bind(shadow_hidden)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
