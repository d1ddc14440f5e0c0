//! Category-change vote tallies and per-user records.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use openskip_core::types::Timestamp;

/// A row from the `category_votes` table: one candidate category's tally
/// on one segment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryVote {
    pub id: i64,
    pub segment_uuid: Uuid,
    pub category: String,
    pub votes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `category_vote_records` table: which candidate a user
/// currently backs on a segment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryVoteRecord {
    pub id: i64,
    pub segment_uuid: Uuid,
    pub user_id: String,
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
