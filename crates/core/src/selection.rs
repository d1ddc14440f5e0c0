//! Read-time segment selection.
//!
//! Takes every candidate segment stored for a video plus the caller's
//! filters and resolves them into the deduplicated, non-conflicting set a
//! client should act on. Skip and mute segments interact as one class,
//! chapters tolerate partial overlap, and point/full segments collapse to
//! a single winner per video.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::category::{ActionType, Category};
use crate::types::{SegmentUuid, Timestamp, DEAD_VOTE_THRESHOLD};

/// Overlap fraction (intersection over the shorter chapter) at which two
/// chapters stop being distinct and start competing.
pub const CHAPTER_DISTINCT_OVERLAP: f64 = 0.6;

/* --------------------------------------------------------------------------
Inputs
-------------------------------------------------------------------------- */

/// A candidate segment as loaded from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentView {
    pub uuid: SegmentUuid,
    pub video_id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub category: Category,
    pub action_type: ActionType,
    pub votes: i32,
    pub locked: bool,
    pub hidden: bool,
    pub shadow_hidden: bool,
    pub video_duration: f64,
    pub time_submitted: Timestamp,
    pub user_id: String,
    pub description: String,
}

impl SegmentView {
    pub fn is_live(&self) -> bool {
        self.votes > DEAD_VOTE_THRESHOLD
    }

    fn is_visible(&self) -> bool {
        self.is_live() && !self.hidden && !self.shadow_hidden
    }

    fn length(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Caller-requested filters for one selection query.
#[derive(Debug, Clone, Default)]
pub struct SelectionFilter {
    /// `None` means all categories.
    pub categories: Option<Vec<Category>>,
    /// `None` means all action types.
    pub action_types: Option<Vec<ActionType>>,
    /// UUIDs included regardless of visibility, filters, and ranking.
    pub required: Vec<SegmentUuid>,
}

impl SelectionFilter {
    fn matches(&self, segment: &SegmentView) -> bool {
        let category_ok = self
            .categories
            .as_ref()
            .map_or(true, |cs| cs.contains(&segment.category));
        let action_ok = self
            .action_types
            .as_ref()
            .map_or(true, |ats| ats.contains(&segment.action_type));
        category_ok && action_ok
    }
}

/* --------------------------------------------------------------------------
Selection
-------------------------------------------------------------------------- */

/// Resolve all candidates for one video into the response set, ordered by
/// start time.
pub fn select_for_video(candidates: Vec<SegmentView>, filter: &SelectionFilter) -> Vec<SegmentView> {
    let required: HashSet<SegmentUuid> = filter.required.iter().copied().collect();

    let mut skip_mute = Vec::new();
    let mut chapters = Vec::new();
    let mut points = Vec::new();
    let mut fulls = Vec::new();

    let mut seen = HashSet::new();
    for segment in candidates {
        if !seen.insert(segment.uuid) {
            continue;
        }
        let pinned = required.contains(&segment.uuid);
        if !pinned && !(segment.is_visible() && filter.matches(&segment)) {
            continue;
        }
        match segment.action_type {
            ActionType::Skip | ActionType::Mute => skip_mute.push(segment),
            ActionType::Chapter => chapters.push(segment),
            ActionType::Poi => points.push(segment),
            ActionType::Full => fulls.push(segment),
        }
    }

    let mut selected = Vec::new();
    selected.extend(resolve_conflicts(skip_mute, &required, skip_mute_conflict));
    selected.extend(resolve_conflicts(chapters, &required, chapter_conflict));
    selected.extend(single_winner(points, &required));
    selected.extend(single_winner(fulls, &required));

    selected.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.uuid.cmp(&b.uuid))
    });
    selected
}

/// Pick the segment whose time range represents the video (for preview
/// thumbnails): the oldest live, unhidden, duration-bearing segment.
pub fn pick_representative(segments: &[SegmentView]) -> Option<&SegmentView> {
    segments
        .iter()
        .filter(|s| s.is_visible() && s.video_duration > 0.0)
        .min_by(|a, b| {
            a.time_submitted
                .cmp(&b.time_submitted)
                .then_with(|| a.uuid.cmp(&b.uuid))
        })
}

/* --------------------------------------------------------------------------
Conflict predicates
-------------------------------------------------------------------------- */

fn overlaps(a: &SegmentView, b: &SegmentView) -> bool {
    a.start_time < b.end_time && b.start_time < a.end_time
}

fn same_interval(a: &SegmentView, b: &SegmentView) -> bool {
    a.start_time == b.start_time && a.end_time == b.end_time
}

/// A skip fully nested inside a longer mute is retained alongside it; any
/// other overlap within the class is a conflict.
fn skip_mute_conflict(a: &SegmentView, b: &SegmentView) -> bool {
    if !overlaps(a, b) {
        return false;
    }
    let nested = |inner: &SegmentView, outer: &SegmentView| {
        inner.action_type == ActionType::Skip
            && outer.action_type == ActionType::Mute
            && inner.start_time >= outer.start_time
            && inner.end_time <= outer.end_time
            && inner.length() < outer.length()
    };
    !(nested(a, b) || nested(b, a))
}

/// Chapters with a small enough overlap fraction describe distinct
/// chapters; past the threshold they compete for the same moment.
fn chapter_conflict(a: &SegmentView, b: &SegmentView) -> bool {
    if !overlaps(a, b) {
        return false;
    }
    let intersection = a.end_time.min(b.end_time) - a.start_time.max(b.start_time);
    let shorter = a.length().min(b.length());
    if shorter <= 0.0 {
        return true;
    }
    intersection / shorter >= CHAPTER_DISTINCT_OVERLAP
}

/* --------------------------------------------------------------------------
Ranking
-------------------------------------------------------------------------- */

/// Ordering between two competing segments: lock first, then category
/// priority when the intervals coincide exactly, then votes, then age.
/// `Less` means `a` outranks `b`.
fn rank(a: &SegmentView, b: &SegmentView) -> Ordering {
    b.locked
        .cmp(&a.locked)
        .then_with(|| {
            if same_interval(a, b) {
                b.category.priority().cmp(&a.category.priority())
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| b.votes.cmp(&a.votes))
        .then_with(|| a.time_submitted.cmp(&b.time_submitted))
        .then_with(|| a.uuid.cmp(&b.uuid))
}

/// Repeatedly drop the lower-ranked member of the first conflicting pair
/// until the group is conflict-free. Required segments are never dropped.
fn resolve_conflicts(
    mut group: Vec<SegmentView>,
    required: &HashSet<SegmentUuid>,
    conflict: fn(&SegmentView, &SegmentView) -> bool,
) -> Vec<SegmentView> {
    group.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.uuid.cmp(&b.uuid))
    });

    loop {
        let mut loser = None;
        'scan: for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                if !conflict(&group[i], &group[j]) {
                    continue;
                }
                let i_required = required.contains(&group[i].uuid);
                let j_required = required.contains(&group[j].uuid);
                if i_required && j_required {
                    continue;
                }
                loser = Some(if i_required {
                    j
                } else if j_required {
                    i
                } else if rank(&group[i], &group[j]) == Ordering::Less {
                    j
                } else {
                    i
                });
                break 'scan;
            }
        }
        match loser {
            Some(idx) => {
                group.remove(idx);
            }
            None => return group,
        }
    }
}

/// Classes that resolve to exactly one winner per video (points, fulls):
/// the best-ranked segment plus any explicitly required ones.
fn single_winner(mut group: Vec<SegmentView>, required: &HashSet<SegmentUuid>) -> Vec<SegmentView> {
    group.sort_by(rank);
    let winner = group.first().map(|s| s.uuid);
    group
        .into_iter()
        .filter(|s| Some(s.uuid) == winner || required.contains(&s.uuid))
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
