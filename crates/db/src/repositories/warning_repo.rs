//! Repository for the `warnings` table.

use sqlx::PgPool;

use crate::models::moderation::{NewWarning, Warning};

const WARNING_COLUMNS: &str =
    "id, user_id, issuer_user_id, reason, enabled, issue_time, created_at, updated_at";

/// Moderator warnings gating a user's submissions and votes.
pub struct WarningRepo;

impl WarningRepo {
    /// The newest enabled warning for a user, if any.
    pub async fn newest_enabled(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<Warning>, sqlx::Error> {
        let query = format!(
            "SELECT {WARNING_COLUMNS} FROM warnings
             WHERE user_id = $1 AND enabled
             ORDER BY issue_time DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Warning>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Issue a warning. At most one warning per user is enabled at a
    /// time: any prior enabled warnings are disabled first, keeping the
    /// history.
    pub async fn issue(pool: &PgPool, input: &NewWarning) -> Result<Warning, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE warnings SET enabled = FALSE, updated_at = now()
             WHERE user_id = $1 AND enabled",
        )
        .bind(&input.user_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO warnings (user_id, issuer_user_id, reason)
             VALUES ($1, $2, $3)
             RETURNING {WARNING_COLUMNS}"
        );
        let warning = sqlx::query_as::<_, Warning>(&query)
            .bind(&input.user_id)
            .bind(&input.issuer_user_id)
            .bind(&input.reason)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(warning)
    }

    /// Disable the user's enabled warnings. Returns how many were lifted.
    pub async fn lift(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE warnings SET enabled = FALSE, updated_at = now()
             WHERE user_id = $1 AND enabled",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Full warning history for a user, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Warning>, sqlx::Error> {
        let query = format!(
            "SELECT {WARNING_COLUMNS} FROM warnings
             WHERE user_id = $1
             ORDER BY issue_time DESC"
        );
        sqlx::query_as::<_, Warning>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
