//! Read-path orchestration.
//!
//! Loads candidate rows, projects them into the core selection engine,
//! and shapes the response: per-video queries return the resolved set,
//! hash-prefix queries group results per video, and aggregate counts may
//! be served from the advisory cache under load.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use openskip_core::category::Service;
use openskip_core::error::CoreError;
use openskip_core::selection::{pick_representative, select_for_video, SegmentView, SelectionFilter};
use openskip_db::repositories::SegmentRepo;

use crate::error::EngineResult;
use crate::state::ServiceState;
use crate::submission::count_key;

/// Accepted shape of a privacy-preserving hash prefix.
static HASH_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9a-f]{4,32}$").expect("hash prefix regex"));

/// The resolved segments of one video in a prefix query response.
#[derive(Debug, Clone)]
pub struct VideoSegments {
    pub video_id: String,
    pub hashed_video_id: String,
    pub segments: Vec<SegmentView>,
}

pub struct SelectionService;

impl SelectionService {
    /// The resolved, non-conflicting segment set for one video.
    ///
    /// Reports not-found rather than an empty list when nothing survives
    /// filtering.
    pub async fn segments_for_video(
        state: &ServiceState,
        video_id: &str,
        service: Service,
        filter: &SelectionFilter,
    ) -> EngineResult<Vec<SegmentView>> {
        let rows = SegmentRepo::list_for_video(&state.pool, video_id, service.as_str()).await?;
        let candidates = rows
            .iter()
            .map(|r| r.to_view())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("stored segment row: {e}")))?;

        let selected = select_for_video(candidates, filter);
        if selected.is_empty() {
            return Err(CoreError::NotFound(format!("no segments for video {video_id}")).into());
        }
        Ok(selected)
    }

    /// Resolve segments for every video whose hashed ID starts with the
    /// given prefix, grouped per video.
    pub async fn segments_by_hash_prefix(
        state: &ServiceState,
        prefix: &str,
        service: Service,
        filter: &SelectionFilter,
    ) -> EngineResult<Vec<VideoSegments>> {
        let prefix = prefix.to_ascii_lowercase();
        if !HASH_PREFIX_RE.is_match(&prefix) {
            return Err(CoreError::Validation(
                "Hash prefix must be 4-32 lowercase hex characters".to_string(),
            )
            .into());
        }

        let rows = SegmentRepo::list_by_hash_prefix(&state.pool, &prefix, service.as_str()).await?;

        let mut by_video: BTreeMap<String, (String, Vec<SegmentView>)> = BTreeMap::new();
        for row in &rows {
            let view = row
                .to_view()
                .map_err(|e| CoreError::Internal(format!("stored segment row: {e}")))?;
            by_video
                .entry(row.video_id.clone())
                .or_insert_with(|| (row.hashed_video_id.clone(), Vec::new()))
                .1
                .push(view);
        }

        let mut results = Vec::new();
        for (video_id, (hashed_video_id, candidates)) in by_video {
            let segments = select_for_video(candidates, filter);
            if !segments.is_empty() {
                results.push(VideoSegments {
                    video_id,
                    hashed_video_id,
                    segments,
                });
            }
        }

        if results.is_empty() {
            return Err(CoreError::NotFound(format!("no segments under prefix {prefix}")).into());
        }
        Ok(results)
    }

    /// Visible-segment count for a video, served from the advisory cache
    /// when fresh. Under high load a cache miss is refused rather than
    /// hitting the store.
    pub async fn visible_segment_count(
        state: &ServiceState,
        video_id: &str,
        service: Service,
    ) -> EngineResult<i64> {
        let key = count_key(service.as_str(), video_id);
        if let Some(count) = state.counts.get(&key).await {
            return Ok(count);
        }
        if state.is_high_load() {
            return Err(CoreError::Overloaded.into());
        }

        let count =
            SegmentRepo::count_visible_for_video(&state.pool, video_id, service.as_str()).await?;
        state.counts.put(&key, count).await;
        Ok(count)
    }

    /// The segment whose time range represents the video (preview
    /// thumbnail semantics).
    pub async fn representative_segment(
        state: &ServiceState,
        video_id: &str,
        service: Service,
    ) -> EngineResult<SegmentView> {
        let rows = SegmentRepo::list_for_video(&state.pool, video_id, service.as_str()).await?;
        let candidates = rows
            .iter()
            .map(|r| r.to_view())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("stored segment row: {e}")))?;

        pick_representative(&candidates)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("no representative for {video_id}")).into())
    }

    /// Record that a client acted on a segment.
    pub async fn mark_viewed(state: &ServiceState, uuid: Uuid) -> EngineResult<()> {
        let matched = SegmentRepo::increment_views(&state.pool, uuid).await?;
        if matched == 0 {
            return Err(CoreError::NotFound(format!("segment {uuid}")).into());
        }
        Ok(())
    }
}
