//! Submission validation (automoderation rules).
//!
//! `validate_batch` is the single gate between a proposed batch of segments
//! and the store: it either rejects the whole batch with a typed error or
//! returns one disposition per proposed segment. A rejected batch must
//! leave zero rows behind, so all checks run before any insert.

use crate::category::{ActionType, Category};
use crate::error::CoreError;
use crate::types::DEAD_VOTE_THRESHOLD;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum number of segments in one submission.
pub const MAX_BATCH_SIZE: usize = 10;

/// Maximum length of a chapter description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Minimum length of a non-point segment.
pub const MIN_SEGMENT_DURATION_SECS: f64 = 1.0;

/// Fraction of the video that skip/mute segments may cover in total.
pub const AUTOMOD_DURATION_FRACTION: f64 = 0.8;

/// How far a freshly observed video duration may drift from the stored one
/// before the correction side effects (re-hide, lock clearing) fire.
pub const DURATION_CHANGE_TOLERANCE_SECS: f64 = 2.0;

/// Shown to warned submitters whose active warning has no custom reason.
pub const DEFAULT_WARNING_MESSAGE: &str =
    "Submissions from your account are blocked due to a moderator warning";

/* --------------------------------------------------------------------------
Inputs
-------------------------------------------------------------------------- */

/// One segment of a proposed batch.
#[derive(Debug, Clone)]
pub struct ProposedSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub category: Category,
    pub action_type: ActionType,
    pub description: Option<String>,
}

/// The slice of an existing row the validator needs.
#[derive(Debug, Clone)]
pub struct ExistingSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub category: Category,
    pub action_type: ActionType,
    pub votes: i32,
    pub user_id: String,
}

impl ExistingSegment {
    fn is_live(&self) -> bool {
        self.votes > DEAD_VOTE_THRESHOLD
    }
}

/// A category lock on the video being submitted to.
#[derive(Debug, Clone)]
pub struct LockEntry {
    pub category: Category,
    pub action_type: ActionType,
    pub reason: String,
}

/// The submitter's moderation standing at submission time.
#[derive(Debug, Clone, Default)]
pub struct SubmitterStanding {
    pub is_vip: bool,
    pub is_shadow_banned: bool,
    /// Reason of the newest enabled warning, if any. An empty string means
    /// the warning exists but carries no custom reason.
    pub active_warning: Option<String>,
}

/// Video-level context: known duration plus everything already stored.
#[derive(Debug, Clone, Default)]
pub struct VideoState {
    /// Known duration in seconds; `0.0` means unknown.
    pub duration_secs: f64,
    pub existing: Vec<ExistingSegment>,
    pub locks: Vec<LockEntry>,
}

/* --------------------------------------------------------------------------
Output
-------------------------------------------------------------------------- */

/// What to do with one accepted segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Insert a row with these initial flags.
    Persist { shadow_hidden: bool, locked: bool },
    /// Report success to the caller but write nothing
    /// (shadow-banned full-video submissions).
    Drop,
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

/// Validate a proposed batch against the submitter's standing and the
/// video's stored state. Returns one disposition per proposed segment, in
/// order, or the error that rejects the entire batch.
pub fn validate_batch(
    submitter_id: &str,
    standing: &SubmitterStanding,
    video: &VideoState,
    proposed: &[ProposedSegment],
) -> Result<Vec<Disposition>, CoreError> {
    if proposed.is_empty() {
        return Err(CoreError::Validation("Empty segment batch".to_string()));
    }
    if proposed.len() > MAX_BATCH_SIZE {
        return Err(CoreError::Validation(format!(
            "Batch of {} segments exceeds the maximum of {MAX_BATCH_SIZE}",
            proposed.len()
        )));
    }

    if let Some(reason) = &standing.active_warning {
        let message = if reason.trim().is_empty() {
            DEFAULT_WARNING_MESSAGE.to_string()
        } else {
            reason.clone()
        };
        return Err(CoreError::Policy(message));
    }

    for segment in proposed {
        validate_shape(segment, video.duration_secs)?;
    }

    if !standing.is_vip {
        check_locks(proposed, &video.locks)?;
    }

    check_duplicates(submitter_id, &video.existing, proposed)?;

    if !standing.is_vip {
        check_automod(video, proposed)?;
    }

    Ok(proposed
        .iter()
        .map(|segment| {
            if standing.is_shadow_banned && segment.action_type == ActionType::Full {
                Disposition::Drop
            } else {
                Disposition::Persist {
                    shadow_hidden: standing.is_shadow_banned,
                    locked: standing.is_vip,
                }
            }
        })
        .collect())
}

/// Whether a freshly observed duration is meaningfully different from the
/// stored one. Unknown values (0) on either side never count as a change.
pub fn duration_changed(stored_secs: f64, observed_secs: f64) -> bool {
    stored_secs > 0.0
        && observed_secs > 0.0
        && (observed_secs - stored_secs).abs() > DURATION_CHANGE_TOLERANCE_SECS
}

fn validate_shape(segment: &ProposedSegment, video_duration: f64) -> Result<(), CoreError> {
    let (start, end) = (segment.start_time, segment.end_time);

    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
        return Err(CoreError::Validation(format!(
            "Segment times must be non-negative finite seconds, got [{start}, {end}]"
        )));
    }

    if !segment
        .category
        .allowed_action_types()
        .contains(&segment.action_type)
    {
        return Err(CoreError::Validation(format!(
            "Action type '{}' is not allowed for category '{}'",
            segment.action_type, segment.category
        )));
    }

    if segment.action_type == ActionType::Full {
        if start != 0.0 || end != 0.0 {
            return Err(CoreError::Validation(
                "Full-video segments must have startTime and endTime of 0".to_string(),
            ));
        }
    } else if segment.category.is_point() {
        if start != end {
            return Err(CoreError::Validation(format!(
                "Category '{}' marks a single timestamp; startTime must equal endTime",
                segment.category
            )));
        }
    } else {
        if start >= end {
            return Err(CoreError::Validation(format!(
                "startTime must be before endTime, got [{start}, {end}]"
            )));
        }
        // The 1s floor is waived only when the whole video is too short
        // for it to be meaningful.
        let video_too_short = video_duration > 0.0 && video_duration < 2.0 * MIN_SEGMENT_DURATION_SECS;
        if end - start < MIN_SEGMENT_DURATION_SECS && !video_too_short {
            return Err(CoreError::Validation(format!(
                "Segments must be at least {MIN_SEGMENT_DURATION_SECS} seconds long"
            )));
        }
    }

    match &segment.description {
        Some(text) if !text.is_empty() => {
            if !segment.category.carries_description() {
                return Err(CoreError::Validation(format!(
                    "Category '{}' does not carry a description",
                    segment.category
                )));
            }
            if text.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Description exceeds {MAX_DESCRIPTION_LENGTH} characters"
                )));
            }
        }
        _ => {
            if segment.category.carries_description() {
                return Err(CoreError::Validation(
                    "Chapter segments require a description".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// A single locked `(category, actionType)` hit rejects the whole batch.
fn check_locks(proposed: &[ProposedSegment], locks: &[LockEntry]) -> Result<(), CoreError> {
    for segment in proposed {
        if let Some(lock) = locks
            .iter()
            .find(|l| l.category == segment.category && l.action_type == segment.action_type)
        {
            let mut message = format!(
                "Category '{}' is locked for this video",
                segment.category
            );
            if !lock.reason.trim().is_empty() {
                message.push_str(": ");
                message.push_str(lock.reason.trim());
            }
            return Err(CoreError::Policy(message));
        }
    }
    Ok(())
}

/// Exactly one live segment may exist per
/// `(videoID, userID, startTime, endTime, category)` tuple.
fn check_duplicates(
    submitter_id: &str,
    existing: &[ExistingSegment],
    proposed: &[ProposedSegment],
) -> Result<(), CoreError> {
    for (i, segment) in proposed.iter().enumerate() {
        let already_stored = existing.iter().any(|e| {
            e.is_live()
                && e.user_id == submitter_id
                && e.category == segment.category
                && e.start_time == segment.start_time
                && e.end_time == segment.end_time
        });
        let repeated_in_batch = proposed[..i].iter().any(|p| {
            p.category == segment.category
                && p.start_time == segment.start_time
                && p.end_time == segment.end_time
        });
        if already_stored || repeated_in_batch {
            return Err(CoreError::Conflict(format!(
                "Segment [{}, {}] in category '{}' was already submitted",
                segment.start_time, segment.end_time, segment.category
            )));
        }
    }
    Ok(())
}

/// Reject the batch when skip/mute coverage would exceed the automod
/// fraction of the video. Skipped when the duration is unknown.
fn check_automod(video: &VideoState, proposed: &[ProposedSegment]) -> Result<(), CoreError> {
    if video.duration_secs <= 0.0 {
        return Ok(());
    }

    let counts = |action: ActionType| matches!(action, ActionType::Skip | ActionType::Mute);

    let existing_total: f64 = video
        .existing
        .iter()
        .filter(|e| e.is_live() && counts(e.action_type))
        .map(|e| e.end_time - e.start_time)
        .sum();
    let proposed_total: f64 = proposed
        .iter()
        .filter(|p| counts(p.action_type))
        .map(|p| p.end_time - p.start_time)
        .sum();

    if existing_total + proposed_total > AUTOMOD_DURATION_FRACTION * video.duration_secs {
        return Err(CoreError::Policy(format!(
            "Automoderation: segments would cover more than {:.0}% of the video",
            AUTOMOD_DURATION_FRACTION * 100.0
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
