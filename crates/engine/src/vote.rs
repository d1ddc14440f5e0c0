//! Vote orchestration.
//!
//! Resolves the voter's standing, runs the core vote state machine, and
//! persists the outcome: the vote count mutation is a single
//! read-modify-write statement, with the private vote record updated
//! alongside it.

use serde::Deserialize;
use uuid::Uuid;

use openskip_core::category::{ActionType, Category};
use openskip_core::category_vote::{
    authorize_category_vote, should_flip, CategoryVoteAuthorization,
};
use openskip_core::error::CoreError;
use openskip_core::hashing::hash_user_id;
use openskip_core::vote::{
    evaluate_vote, PriorVote, RecordChange, SegmentVoteState, VoteIntent, VoterStanding,
};
use openskip_db::models::segment::Segment;
use openskip_db::repositories::{
    CategoryVoteRepo, LockCategoryRepo, SegmentRepo, ShadowBanRepo, VipUserRepo, VoteRecordRepo,
    WarningRepo,
};

use crate::error::EngineResult;
use crate::state::ServiceState;
use crate::submission::count_key;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

/// An up/down/undo/malicious vote on a segment.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub uuid: Uuid,
    /// The client's private user ID; hashed before lookup.
    pub user_id: String,
    /// Wire code: 0, 1, 20, or 30.
    pub vote_type: u8,
    /// Fresh video duration, consumed by VIP upvotes to refresh a stale
    /// snapshot.
    #[serde(default)]
    pub video_duration: Option<f64>,
}

/// A vote for an alternate category on a segment.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryVoteRequest {
    pub uuid: Uuid,
    pub user_id: String,
    pub category: Category,
}

/* --------------------------------------------------------------------------
Service
-------------------------------------------------------------------------- */

pub struct VoteService;

impl VoteService {
    /// Apply one vote intent, returning the segment row after the vote.
    pub async fn vote(state: &ServiceState, request: &VoteRequest) -> EngineResult<Segment> {
        let intent = VoteIntent::from_code(request.vote_type)?;
        let public_user_id = hash_user_id(&request.user_id);

        let segment = SegmentRepo::find_by_uuid(&state.pool, request.uuid)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("segment {}", request.uuid)))?;
        let (category, action_type) = segment
            .classification()
            .map_err(|e| CoreError::Internal(format!("stored segment row: {e}")))?;

        let (is_vip, is_shadow_banned, warning, prior) = futures::try_join!(
            VipUserRepo::is_vip(&state.pool, &public_user_id),
            ShadowBanRepo::is_banned(&state.pool, &public_user_id),
            WarningRepo::newest_enabled(&state.pool, &public_user_id),
            VoteRecordRepo::find(&state.pool, request.uuid, &public_user_id),
        )?;
        let is_owner = segment.user_id == public_user_id;

        // Eligibility lookups only run when the state machine will consult
        // them: ordinary non-owner directional votes and malicious reports.
        let directional = matches!(intent, VoteIntent::Up | VoteIntent::Down);
        let has_matching_submission = if directional && !is_vip && !is_owner {
            if action_type == ActionType::Full {
                SegmentRepo::user_has_live_with_action(
                    &state.pool,
                    &public_user_id,
                    category.as_str(),
                    action_type.as_str(),
                )
                .await?
            } else {
                SegmentRepo::user_has_live_in_category(
                    &state.pool,
                    &public_user_id,
                    category.as_str(),
                )
                .await?
            }
        } else {
            false
        };
        let has_chapter_submission = if intent == VoteIntent::Malicious && !is_vip {
            SegmentRepo::user_has_chapter_submission(&state.pool, &public_user_id).await?
        } else {
            false
        };

        let voter = VoterStanding {
            is_vip,
            is_shadow_banned,
            has_active_warning: warning.is_some(),
            is_owner,
            has_matching_submission,
            has_chapter_submission,
        };
        let vote_state = SegmentVoteState {
            votes: segment.votes,
            locked: segment.locked,
            hidden: segment.hidden,
            category,
            video_duration: segment.video_duration,
        };
        let prior_vote = prior.map(|r| PriorVote {
            code: r.vote_type,
            delta: r.applied_delta,
        });

        let outcome = evaluate_vote(&vote_state, &voter, prior_vote, intent, request.video_duration)?;
        if outcome.is_no_effect() {
            return Ok(segment);
        }

        let updated = SegmentRepo::apply_vote(
            &state.pool,
            request.uuid,
            outcome.vote_delta,
            outcome.set_locked,
            outcome.set_hidden,
            outcome.set_video_duration,
        )
        .await?;

        match outcome.record {
            RecordChange::Keep => {}
            RecordChange::Upsert { code, delta } => {
                VoteRecordRepo::upsert(&state.pool, request.uuid, &public_user_id, code, delta)
                    .await?;
            }
            RecordChange::Remove => {
                VoteRecordRepo::delete(&state.pool, request.uuid, &public_user_id).await?;
            }
        }

        state
            .counts
            .invalidate(&count_key(&segment.service, &segment.video_id))
            .await;

        tracing::info!(
            uuid = %request.uuid,
            user_id = %public_user_id,
            vote_type = request.vote_type,
            votes = updated.votes,
            "Vote applied"
        );

        Ok(updated)
    }

    /// Apply a category-change vote, returning the segment row afterwards.
    pub async fn vote_category(
        state: &ServiceState,
        request: &CategoryVoteRequest,
    ) -> EngineResult<Segment> {
        let public_user_id = hash_user_id(&request.user_id);

        let segment = SegmentRepo::find_by_uuid(&state.pool, request.uuid)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("segment {}", request.uuid)))?;
        let (current_category, action_type) = segment
            .classification()
            .map_err(|e| CoreError::Internal(format!("stored segment row: {e}")))?;

        let (is_vip, is_shadow_banned, warning, destination_locked) = futures::try_join!(
            VipUserRepo::is_vip(&state.pool, &public_user_id),
            ShadowBanRepo::is_banned(&state.pool, &public_user_id),
            WarningRepo::newest_enabled(&state.pool, &public_user_id),
            LockCategoryRepo::category_is_locked(
                &state.pool,
                &segment.video_id,
                &segment.service,
                request.category.as_str(),
            ),
        )?;

        let voter = VoterStanding {
            is_vip,
            is_shadow_banned,
            has_active_warning: warning.is_some(),
            ..VoterStanding::default()
        };

        let authorization = authorize_category_vote(
            &voter,
            segment.locked,
            action_type,
            current_category,
            request.category,
            destination_locked,
        )?;

        match authorization {
            CategoryVoteAuthorization::NoEffect => Ok(segment),
            CategoryVoteAuthorization::Commit => {
                let updated = SegmentRepo::set_category(
                    &state.pool,
                    request.uuid,
                    request.category.as_str(),
                )
                .await?;
                tracing::info!(
                    uuid = %request.uuid,
                    from = %current_category,
                    to = %request.category,
                    "Category committed by VIP vote"
                );
                Ok(updated)
            }
            CategoryVoteAuthorization::Tally => {
                let candidate_tally = CategoryVoteRepo::cast_vote(
                    &state.pool,
                    request.uuid,
                    &public_user_id,
                    request.category.as_str(),
                )
                .await?;
                let current_tally = CategoryVoteRepo::tally(
                    &state.pool,
                    request.uuid,
                    current_category.as_str(),
                )
                .await?;

                if should_flip(candidate_tally, current_tally) {
                    let updated = SegmentRepo::set_category(
                        &state.pool,
                        request.uuid,
                        request.category.as_str(),
                    )
                    .await?;
                    tracing::info!(
                        uuid = %request.uuid,
                        from = %current_category,
                        to = %request.category,
                        candidate_tally,
                        current_tally,
                        "Category flipped"
                    );
                    Ok(updated)
                } else {
                    Ok(segment)
                }
            }
        }
    }
}
