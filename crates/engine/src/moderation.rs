//! Moderation cascade.
//!
//! Shadow-ban state changes re-derive visibility across everything a user
//! contributed (segments plus derivative title/thumbnail votes) inside
//! one transaction, so a partial cascade can never be observed. Warnings
//! and category locks are managed here too.

use serde::Deserialize;

use openskip_core::category::{ActionType, Category, Service};
use openskip_core::error::CoreError;
use openskip_db::models::lock_category::{LockCategory, NewLockCategory};
use openskip_db::models::moderation::{NewWarning, Warning};
use openskip_db::repositories::{
    BrandingRepo, LockCategoryRepo, SegmentRepo, ShadowBanRepo, VipUserRepo, WarningRepo,
};

use crate::error::EngineResult;
use crate::state::ServiceState;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

/// Which derivative record kinds a ban cascade touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandingScope {
    Title,
    Thumbnail,
}

/// A shadow-ban state change for one (hashed) user.
#[derive(Debug, Clone, Deserialize)]
pub struct ShadowBanRequest {
    /// The public (hashed) user ID, as moderators see it.
    pub user_id: String,
    pub enabled: bool,
    /// Optional category scope: only matching segments are flipped.
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    /// Optional branding scope: which derivative tables are flipped.
    /// `None` means both.
    #[serde(default)]
    pub scopes: Option<Vec<BrandingScope>>,
    /// Required to re-ban an already-banned user; re-applies hiding to
    /// rows submitted since a prior lift.
    #[serde(default)]
    pub unhide_old_submissions: bool,
}

/// A category lock change on one video, issued by a VIP.
#[derive(Debug, Clone, Deserialize)]
pub struct LockRequest {
    pub video_id: String,
    #[serde(default)]
    pub service: Service,
    pub category: Category,
    pub action_type: ActionType,
    #[serde(default)]
    pub reason: String,
    /// The acting VIP's public (hashed) user ID.
    pub vip_user_id: String,
}

/* --------------------------------------------------------------------------
Service
-------------------------------------------------------------------------- */

pub struct ModerationService;

impl ModerationService {
    /// Apply a shadow-ban state change atomically across the user's
    /// segments and derivative branding votes.
    ///
    /// Locked rows are always excluded from the cascade in both
    /// directions: administrative locks take precedence over ban state.
    pub async fn set_shadow_ban(
        state: &ServiceState,
        request: &ShadowBanRequest,
    ) -> EngineResult<()> {
        let already_banned = ShadowBanRepo::is_banned(&state.pool, &request.user_id).await?;
        if request.enabled && already_banned && !request.unhide_old_submissions {
            return Err(CoreError::Conflict(format!(
                "User {} is already shadow-banned",
                request.user_id
            ))
            .into());
        }

        let categories: Option<Vec<String>> = request
            .categories
            .as_ref()
            .map(|cs| cs.iter().map(|c| c.as_str().to_string()).collect());
        let in_scope = |scope: BrandingScope| {
            request
                .scopes
                .as_ref()
                .map_or(true, |scopes| scopes.contains(&scope))
        };

        let mut tx = state.pool.begin().await?;

        if request.enabled {
            ShadowBanRepo::add_inner(&mut tx, &request.user_id).await?;
        } else {
            ShadowBanRepo::remove_inner(&mut tx, &request.user_id).await?;
        }

        let segment_rows = SegmentRepo::set_shadow_hidden_for_user_inner(
            &mut tx,
            &request.user_id,
            request.enabled,
            categories.as_deref(),
        )
        .await?;

        let mut title_rows = 0;
        if in_scope(BrandingScope::Title) {
            title_rows = BrandingRepo::set_title_shadow_hidden_for_user_inner(
                &mut tx,
                &request.user_id,
                request.enabled,
            )
            .await?;
        }
        let mut thumbnail_rows = 0;
        if in_scope(BrandingScope::Thumbnail) {
            thumbnail_rows = BrandingRepo::set_thumbnail_shadow_hidden_for_user_inner(
                &mut tx,
                &request.user_id,
                request.enabled,
            )
            .await?;
        }

        tx.commit().await?;

        // Visibility changed on an unknown set of videos.
        state.counts.clear().await;

        tracing::info!(
            user_id = %request.user_id,
            enabled = request.enabled,
            segment_rows,
            title_rows,
            thumbnail_rows,
            "Shadow-ban cascade applied"
        );
        Ok(())
    }

    /// Issue a warning, disabling any prior enabled one.
    pub async fn issue_warning(
        state: &ServiceState,
        input: &NewWarning,
    ) -> EngineResult<Warning> {
        let warning = WarningRepo::issue(&state.pool, input).await?;
        tracing::info!(
            user_id = %input.user_id,
            issuer = %input.issuer_user_id,
            "Warning issued"
        );
        Ok(warning)
    }

    /// Lift the user's enabled warnings.
    pub async fn lift_warning(state: &ServiceState, user_id: &str) -> EngineResult<()> {
        let lifted = WarningRepo::lift(&state.pool, user_id).await?;
        if lifted == 0 {
            return Err(CoreError::NotFound(format!("no enabled warning for {user_id}")).into());
        }
        tracing::info!(user_id = %user_id, lifted, "Warning lifted");
        Ok(())
    }

    /// Create or refresh a category lock. VIP-only.
    pub async fn lock_category(
        state: &ServiceState,
        request: &LockRequest,
    ) -> EngineResult<LockCategory> {
        Self::ensure_vip(state, &request.vip_user_id).await?;

        let lock = LockCategoryRepo::upsert(
            &state.pool,
            &NewLockCategory {
                video_id: request.video_id.clone(),
                service: request.service.as_str().to_string(),
                category: request.category.as_str().to_string(),
                action_type: request.action_type.as_str().to_string(),
                reason: request.reason.clone(),
                locked_by: request.vip_user_id.clone(),
            },
        )
        .await?;

        tracing::info!(
            video_id = %request.video_id,
            category = %request.category,
            action_type = %request.action_type,
            "Category locked"
        );
        Ok(lock)
    }

    /// Remove a category lock. VIP-only.
    pub async fn unlock_category(state: &ServiceState, request: &LockRequest) -> EngineResult<()> {
        Self::ensure_vip(state, &request.vip_user_id).await?;

        let removed = LockCategoryRepo::delete(
            &state.pool,
            &request.video_id,
            request.service.as_str(),
            request.category.as_str(),
            request.action_type.as_str(),
        )
        .await?;
        if removed == 0 {
            return Err(CoreError::NotFound(format!(
                "no lock on {} for category {}",
                request.video_id, request.category
            ))
            .into());
        }

        tracing::info!(
            video_id = %request.video_id,
            category = %request.category,
            "Category unlocked"
        );
        Ok(())
    }

    async fn ensure_vip(state: &ServiceState, user_id: &str) -> EngineResult<()> {
        if !VipUserRepo::is_vip(&state.pool, user_id).await? {
            return Err(CoreError::Policy("Category locks are VIP-only".to_string()).into());
        }
        Ok(())
    }
}
