//! Submission orchestration.
//!
//! Loads the submitter's standing and the video's stored state, applies
//! the duration-correction side effect when a fresh duration contradicts
//! the stored snapshot, runs the core validator, and persists the
//! accepted batch in one transaction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use openskip_core::category::{ActionType, Category, Service};
use openskip_core::error::CoreError;
use openskip_core::hashing::{hash_user_id, hash_video_id};
use openskip_core::submission::{
    duration_changed, validate_batch, Disposition, LockEntry, ProposedSegment, SubmitterStanding,
    VideoState,
};
use openskip_db::models::segment::NewSegment;
use openskip_db::repositories::{
    LockCategoryRepo, SegmentRepo, ShadowBanRepo, VipUserRepo, WarningRepo,
};

use crate::error::EngineResult;
use crate::state::ServiceState;

/* --------------------------------------------------------------------------
Request / response types
-------------------------------------------------------------------------- */

/// One proposed segment on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposedSegmentDto {
    pub start_time: f64,
    pub end_time: f64,
    pub category: Category,
    pub action_type: ActionType,
    #[serde(default)]
    pub description: Option<String>,
}

/// A batch submission request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(min = 1, max = 64))]
    pub video_id: String,
    #[serde(default)]
    pub service: Service,
    /// The client's private user ID; hashed before anything is stored.
    #[validate(length(min = 1, max = 256))]
    pub user_id: String,
    #[validate(length(min = 1, max = 10))]
    pub segments: Vec<ProposedSegmentDto>,
    /// Client-observed video duration, used when metadata lookup fails.
    #[serde(default)]
    pub video_duration: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub user_agent: String,
}

/// One accepted segment in the response. Silently-dropped segments get a
/// UUID too, so a shadow-banned submitter cannot tell the difference.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedSegment {
    pub uuid: Uuid,
    pub category: Category,
    pub start_time: f64,
    pub end_time: f64,
}

/* --------------------------------------------------------------------------
Service
-------------------------------------------------------------------------- */

pub struct SubmissionService;

impl SubmissionService {
    /// Validate and persist a batch of segments. All-or-nothing: a
    /// rejected batch leaves zero new rows.
    pub async fn submit(
        state: &ServiceState,
        request: &SubmitRequest,
    ) -> EngineResult<Vec<SubmittedSegment>> {
        request
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let public_user_id = hash_user_id(&request.user_id);
        let hashed_video_id = hash_video_id(&request.video_id);
        let service = request.service.as_str();

        let (mut rows, mut locks, is_vip, is_shadow_banned, warning) = futures::try_join!(
            SegmentRepo::list_for_video(&state.pool, &request.video_id, service),
            LockCategoryRepo::list_for_video(&state.pool, &request.video_id, service),
            VipUserRepo::is_vip(&state.pool, &public_user_id),
            ShadowBanRepo::is_banned(&state.pool, &public_user_id),
            WarningRepo::newest_enabled(&state.pool, &public_user_id),
        )?;

        // Best-effort metadata lookup; the client-supplied duration is the
        // fallback, and 0 means unknown throughout.
        let observed_duration = match state.metadata.lookup(&request.video_id).await {
            Ok(meta) if meta.duration_secs > 0.0 => meta.duration_secs,
            Ok(_) => request.video_duration.unwrap_or(0.0),
            Err(err) => {
                tracing::debug!(video_id = %request.video_id, error = %err, "Metadata lookup failed");
                request.video_duration.unwrap_or(0.0)
            }
        };

        let stored_duration = rows
            .iter()
            .filter(|r| r.video_duration > 0.0)
            .max_by_key(|r| r.time_submitted)
            .map(|r| r.video_duration)
            .unwrap_or(0.0);

        // A meaningfully different duration invalidates prior trust
        // signals: hide existing non-full segments, clear the locks.
        if duration_changed(stored_duration, observed_duration) {
            let mut tx = state.pool.begin().await?;
            let hidden =
                SegmentRepo::hide_non_full_for_video_inner(&mut tx, &request.video_id, service)
                    .await?;
            let cleared =
                LockCategoryRepo::delete_for_video_inner(&mut tx, &request.video_id, service)
                    .await?;
            tx.commit().await?;
            tracing::info!(
                video_id = %request.video_id,
                stored_duration,
                observed_duration,
                hidden,
                cleared,
                "Video duration changed; prior segments hidden and locks cleared"
            );

            for row in &mut rows {
                if row.action_type != "full" && row.votes > -2 {
                    row.hidden = true;
                }
            }
            locks.clear();
        }

        let effective_duration = if observed_duration > 0.0 {
            observed_duration
        } else {
            stored_duration
        };

        let standing = SubmitterStanding {
            is_vip,
            is_shadow_banned,
            active_warning: warning.map(|w| w.reason),
        };
        let existing = rows
            .iter()
            .map(|r| r.to_existing())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("stored segment row: {e}")))?;
        let lock_entries = locks
            .iter()
            .map(|l| {
                Ok(LockEntry {
                    category: l.category.parse()?,
                    action_type: l.action_type.parse()?,
                    reason: l.reason.clone(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()
            .map_err(|e| CoreError::Internal(format!("stored lock row: {e}")))?;
        let proposed: Vec<ProposedSegment> = request
            .segments
            .iter()
            .map(|dto| ProposedSegment {
                start_time: dto.start_time,
                end_time: dto.end_time,
                category: dto.category,
                action_type: dto.action_type,
                description: dto.description.clone(),
            })
            .collect();

        let video_state = VideoState {
            duration_secs: effective_duration,
            existing,
            locks: lock_entries,
        };
        let dispositions = validate_batch(&public_user_id, &standing, &video_state, &proposed)?;

        let mut to_insert = Vec::new();
        let mut response = Vec::with_capacity(request.segments.len());
        for (dto, disposition) in request.segments.iter().zip(&dispositions) {
            let uuid = Uuid::new_v4();
            response.push(SubmittedSegment {
                uuid,
                category: dto.category,
                start_time: dto.start_time,
                end_time: dto.end_time,
            });
            if let Disposition::Persist {
                shadow_hidden,
                locked,
            } = disposition
            {
                to_insert.push(NewSegment {
                    uuid,
                    video_id: request.video_id.clone(),
                    hashed_video_id: hashed_video_id.clone(),
                    service: service.to_string(),
                    start_time: dto.start_time,
                    end_time: dto.end_time,
                    category: dto.category.as_str().to_string(),
                    action_type: dto.action_type.as_str().to_string(),
                    user_id: public_user_id.clone(),
                    video_duration: effective_duration,
                    user_agent: request.user_agent.clone(),
                    description: dto.description.clone().unwrap_or_default(),
                    shadow_hidden: *shadow_hidden,
                    locked: *locked,
                    reputation: 0.0,
                });
            }
        }

        if !to_insert.is_empty() {
            SegmentRepo::insert_batch(&state.pool, &to_insert).await?;
        }

        state
            .counts
            .invalidate(&count_key(service, &request.video_id))
            .await;

        tracing::info!(
            video_id = %request.video_id,
            user_id = %public_user_id,
            submitted = request.segments.len(),
            persisted = to_insert.len(),
            "Segment batch accepted"
        );

        Ok(response)
    }
}

/// Cache key for per-video aggregate counts.
pub(crate) fn count_key(service: &str, video_id: &str) -> String {
    format!("{service}:{video_id}")
}
