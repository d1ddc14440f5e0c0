//! VIP category locks.

use serde::Serialize;
use sqlx::FromRow;

use openskip_core::types::Timestamp;

/// A row from the `lock_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LockCategory {
    pub id: i64,
    pub video_id: String,
    pub service: String,
    pub category: String,
    pub action_type: String,
    pub reason: String,
    pub locked_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or refreshing a category lock.
#[derive(Debug, Clone)]
pub struct NewLockCategory {
    pub video_id: String,
    pub service: String,
    pub category: String,
    pub action_type: String,
    pub reason: String,
    pub locked_by: String,
}
