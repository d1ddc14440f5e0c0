//! Repository for the `shadow_banned_users` table.
//!
//! The cascade across a user's segments and branding votes is driven by
//! the moderation service inside one transaction; this repo only manages
//! the ban rows themselves.

use sqlx::PgPool;

/// Users whose contributions are excluded from public reads.
pub struct ShadowBanRepo;

impl ShadowBanRepo {
    pub async fn is_banned(pool: &PgPool, user_id: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shadow_banned_users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    pub async fn add_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO shadow_banned_users (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn remove_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shadow_banned_users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
