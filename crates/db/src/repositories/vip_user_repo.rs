//! Repository for the `vip_users` table.

use sqlx::PgPool;

/// Trusted users whose votes and locks bypass normal rules.
pub struct VipUserRepo;

impl VipUserRepo {
    pub async fn is_vip(pool: &PgPool, user_id: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM vip_users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    pub async fn add(pool: &PgPool, user_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO vip_users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn remove(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vip_users WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
