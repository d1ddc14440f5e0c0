//! Repository for the `lock_categories` table.

use sqlx::PgPool;

use crate::models::lock_category::{LockCategory, NewLockCategory};

const LOCK_COLUMNS: &str =
    "id, video_id, service, category, action_type, reason, locked_by, created_at, updated_at";

/// VIP-set locks on `(video, category, actionType)` combinations.
pub struct LockCategoryRepo;

impl LockCategoryRepo {
    /// All locks on a video.
    pub async fn list_for_video(
        pool: &PgPool,
        video_id: &str,
        service: &str,
    ) -> Result<Vec<LockCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {LOCK_COLUMNS} FROM lock_categories
             WHERE video_id = $1 AND service = $2
             ORDER BY category ASC, action_type ASC"
        );
        sqlx::query_as::<_, LockCategory>(&query)
            .bind(video_id)
            .bind(service)
            .fetch_all(pool)
            .await
    }

    /// Whether any lock covers the category on this video, regardless of
    /// action type (category-vote destination check).
    pub async fn category_is_locked(
        pool: &PgPool,
        video_id: &str,
        service: &str,
        category: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM lock_categories
                WHERE video_id = $1 AND service = $2 AND category = $3
            )",
        )
        .bind(video_id)
        .bind(service)
        .bind(category)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Create or refresh a lock, keeping the newest reason.
    pub async fn upsert(
        pool: &PgPool,
        input: &NewLockCategory,
    ) -> Result<LockCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO lock_categories (video_id, service, category, action_type, reason, locked_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (video_id, service, category, action_type) DO UPDATE
                SET reason = EXCLUDED.reason,
                    locked_by = EXCLUDED.locked_by,
                    updated_at = now()
             RETURNING {LOCK_COLUMNS}"
        );
        sqlx::query_as::<_, LockCategory>(&query)
            .bind(&input.video_id)
            .bind(&input.service)
            .bind(&input.category)
            .bind(&input.action_type)
            .bind(&input.reason)
            .bind(&input.locked_by)
            .fetch_one(pool)
            .await
    }

    /// Remove one lock.
    pub async fn delete(
        pool: &PgPool,
        video_id: &str,
        service: &str,
        category: &str,
        action_type: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM lock_categories
             WHERE video_id = $1 AND service = $2 AND category = $3 AND action_type = $4",
        )
        .bind(video_id)
        .bind(service)
        .bind(category)
        .bind(action_type)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Clear every lock on a video (duration correction invalidates the
    /// trust signals the locks were based on).
    pub async fn delete_for_video_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        video_id: &str,
        service: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM lock_categories WHERE video_id = $1 AND service = $2",
        )
        .bind(video_id)
        .bind(service)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
