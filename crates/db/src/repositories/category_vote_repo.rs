//! Repository for category-change vote tallies.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category_vote::CategoryVoteRecord;

const RECORD_COLUMNS: &str = "id, segment_uuid, user_id, category, created_at, updated_at";

/// Tallies one count per distinct voter per segment; a re-vote for a
/// different candidate moves the voter's count.
pub struct CategoryVoteRepo;

impl CategoryVoteRepo {
    /// Current tally for one candidate category on a segment.
    pub async fn tally(
        pool: &PgPool,
        segment_uuid: Uuid,
        category: &str,
    ) -> Result<i32, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT votes FROM category_votes WHERE segment_uuid = $1 AND category = $2",
        )
        .bind(segment_uuid)
        .bind(category)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0).unwrap_or(0))
    }

    /// Which candidate the user currently backs on this segment, if any.
    pub async fn record_for_user(
        pool: &PgPool,
        segment_uuid: Uuid,
        user_id: &str,
    ) -> Result<Option<CategoryVoteRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM category_vote_records
             WHERE segment_uuid = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, CategoryVoteRecord>(&query)
            .bind(segment_uuid)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Cast one category vote, moving the voter's count if they had
    /// previously backed a different candidate. Returns the candidate's
    /// new tally.
    pub async fn cast_vote(
        pool: &PgPool,
        segment_uuid: Uuid,
        user_id: &str,
        category: &str,
    ) -> Result<i32, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prior: Option<(String,)> = sqlx::query_as(
            "SELECT category FROM category_vote_records
             WHERE segment_uuid = $1 AND user_id = $2
             FOR UPDATE",
        )
        .bind(segment_uuid)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        match prior {
            Some((prior_category,)) if prior_category == category => {
                // Repeat vote for the same candidate: no tally change.
                let row: Option<(i32,)> = sqlx::query_as(
                    "SELECT votes FROM category_votes WHERE segment_uuid = $1 AND category = $2",
                )
                .bind(segment_uuid)
                .bind(category)
                .fetch_optional(&mut *tx)
                .await?;
                tx.commit().await?;
                return Ok(row.map(|r| r.0).unwrap_or(0));
            }
            Some((prior_category,)) => {
                sqlx::query(
                    "UPDATE category_votes SET votes = votes - 1, updated_at = now()
                     WHERE segment_uuid = $1 AND category = $2",
                )
                .bind(segment_uuid)
                .bind(&prior_category)
                .execute(&mut *tx)
                .await?;
                sqlx::query(
                    "UPDATE category_vote_records SET category = $3, updated_at = now()
                     WHERE segment_uuid = $1 AND user_id = $2",
                )
                .bind(segment_uuid)
                .bind(user_id)
                .bind(category)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO category_vote_records (segment_uuid, user_id, category)
                     VALUES ($1, $2, $3)",
                )
                .bind(segment_uuid)
                .bind(user_id)
                .bind(category)
                .execute(&mut *tx)
                .await?;
            }
        }

        let row: (i32,) = sqlx::query_as(
            "INSERT INTO category_votes (segment_uuid, category, votes)
             VALUES ($1, $2, 1)
             ON CONFLICT (segment_uuid, category) DO UPDATE
                SET votes = category_votes.votes + 1,
                    updated_at = now()
             RETURNING votes",
        )
        .bind(segment_uuid)
        .bind(category)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.0)
    }
}
