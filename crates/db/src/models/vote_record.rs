//! Per-user private vote bookkeeping.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use openskip_core::types::Timestamp;

/// A row from the `vote_records` table: the one vote a user currently
/// holds on a segment, with the net delta it contributes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VoteRecord {
    pub id: i64,
    pub segment_uuid: Uuid,
    pub user_id: String,
    pub vote_type: i16,
    pub applied_delta: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
