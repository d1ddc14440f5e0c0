//! Moderation state rows: VIPs, shadow bans, warnings.

use serde::Serialize;
use sqlx::FromRow;

use openskip_core::types::Timestamp;

/// A row from the `vip_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VipUser {
    pub user_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `shadow_banned_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShadowBannedUser {
    pub user_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `warnings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Warning {
    pub id: i64,
    pub user_id: String,
    pub issuer_user_id: String,
    pub reason: String,
    pub enabled: bool,
    pub issue_time: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for issuing a warning.
#[derive(Debug, Clone)]
pub struct NewWarning {
    pub user_id: String,
    pub issuer_user_id: String,
    pub reason: String,
}
