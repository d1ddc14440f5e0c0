//! The vote state machine.
//!
//! `evaluate_vote` turns a vote intent into the exact mutation to apply to
//! a segment row plus the bookkeeping change for the voter's private vote
//! record. It never touches storage; the engine persists the outcome with
//! a single-statement read-modify-write.

use crate::category::Category;
use crate::error::CoreError;
use crate::submission::duration_changed;
use crate::types::DEAD_VOTE_THRESHOLD;

/* --------------------------------------------------------------------------
Intents and weights
-------------------------------------------------------------------------- */

/// Wire codes: 0 = downvote, 1 = upvote, 20 = undo, 30 = malicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteIntent {
    Down,
    Up,
    Undo,
    Malicious,
}

impl VoteIntent {
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        match code {
            0 => Ok(VoteIntent::Down),
            1 => Ok(VoteIntent::Up),
            20 => Ok(VoteIntent::Undo),
            30 => Ok(VoteIntent::Malicious),
            other => Err(CoreError::Validation(format!("Unknown vote type {other}"))),
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            VoteIntent::Down => 0,
            VoteIntent::Up => 1,
            VoteIntent::Undo => 20,
            VoteIntent::Malicious => 30,
        }
    }
}

pub const ORDINARY_VOTE_WEIGHT: i32 = 1;
pub const VIP_VOTE_WEIGHT: i32 = 2;

/// Shown to warned users attempting to vote.
pub const WARNED_VOTER_MESSAGE: &str =
    "Votes from your account are blocked due to a moderator warning";

/* --------------------------------------------------------------------------
Inputs
-------------------------------------------------------------------------- */

/// The voter's standing relative to the target segment.
#[derive(Debug, Clone, Default)]
pub struct VoterStanding {
    pub is_vip: bool,
    pub is_shadow_banned: bool,
    pub has_active_warning: bool,
    /// The voter submitted the target segment.
    pub is_owner: bool,
    /// The voter has a live submission in the target's category
    /// (category + action type for full-video targets).
    pub has_matching_submission: bool,
    /// The voter has submitted at least one chapter (malicious eligibility).
    pub has_chapter_submission: bool,
}

/// The slice of the target row the state machine needs.
#[derive(Debug, Clone)]
pub struct SegmentVoteState {
    pub votes: i32,
    pub locked: bool,
    pub hidden: bool,
    pub category: Category,
    /// Duration snapshot on the row; `0.0` means unknown.
    pub video_duration: f64,
}

/// The voter's previously recorded vote on this segment, if any.
#[derive(Debug, Clone, Copy)]
pub struct PriorVote {
    pub code: i16,
    /// Net delta this voter currently contributes to the segment.
    pub delta: i32,
}

/* --------------------------------------------------------------------------
Outcome
-------------------------------------------------------------------------- */

/// Bookkeeping change for the voter's private vote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    Keep,
    Upsert { code: i16, delta: i32 },
    Remove,
}

/// The mutation to persist for one evaluated vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    /// Signed change to the segment's vote count.
    pub vote_delta: i32,
    pub set_locked: Option<bool>,
    pub set_hidden: Option<bool>,
    pub set_video_duration: Option<f64>,
    pub record: RecordChange,
}

impl VoteOutcome {
    fn no_effect() -> Self {
        VoteOutcome {
            vote_delta: 0,
            set_locked: None,
            set_hidden: None,
            set_video_duration: None,
            record: RecordChange::Keep,
        }
    }

    pub fn is_no_effect(&self) -> bool {
        *self == VoteOutcome::no_effect()
    }
}

/* --------------------------------------------------------------------------
State machine
-------------------------------------------------------------------------- */

/// Evaluate one vote intent against the target segment.
///
/// `observed_duration` is the caller-supplied fresh video duration, used
/// only by VIP upvotes to refresh a stale snapshot.
pub fn evaluate_vote(
    segment: &SegmentVoteState,
    voter: &VoterStanding,
    prior: Option<PriorVote>,
    intent: VoteIntent,
    observed_duration: Option<f64>,
) -> Result<VoteOutcome, CoreError> {
    if voter.has_active_warning {
        return Err(CoreError::Policy(WARNED_VOTER_MESSAGE.to_string()));
    }

    // Shadow-banned votes are accepted but never counted, and leave no
    // record behind that an unban could resurrect.
    if voter.is_shadow_banned {
        return Ok(VoteOutcome::no_effect());
    }

    match intent {
        VoteIntent::Undo => Ok(undo(prior)),
        VoteIntent::Malicious => malicious(segment, voter, prior),
        VoteIntent::Up | VoteIntent::Down => directional(segment, voter, prior, intent, observed_duration),
    }
}

fn undo(prior: Option<PriorVote>) -> VoteOutcome {
    match prior {
        None => VoteOutcome::no_effect(),
        Some(p) => VoteOutcome {
            vote_delta: -p.delta,
            set_locked: None,
            set_hidden: None,
            set_video_duration: None,
            record: RecordChange::Remove,
        },
    }
}

fn malicious(
    segment: &SegmentVoteState,
    voter: &VoterStanding,
    prior: Option<PriorVote>,
) -> Result<VoteOutcome, CoreError> {
    if segment.category != Category::Chapter {
        return Err(CoreError::Validation(
            "Malicious reports only apply to chapter segments".to_string(),
        ));
    }
    if !voter.is_vip && !voter.has_chapter_submission {
        return Err(CoreError::Policy(
            "Only users who have submitted a chapter may report one as malicious".to_string(),
        ));
    }
    if matches!(prior, Some(p) if p.code == VoteIntent::Malicious.code()) {
        return Ok(VoteOutcome::no_effect());
    }
    if segment.votes <= DEAD_VOTE_THRESHOLD {
        return Ok(VoteOutcome::no_effect());
    }

    // Drive straight to the dead threshold; recording the exact delta keeps
    // undo able to restore the previous count.
    let delta = DEAD_VOTE_THRESHOLD - segment.votes;
    Ok(VoteOutcome {
        vote_delta: delta,
        set_locked: None,
        set_hidden: None,
        set_video_duration: None,
        record: RecordChange::Upsert {
            code: VoteIntent::Malicious.code(),
            delta,
        },
    })
}

fn directional(
    segment: &SegmentVoteState,
    voter: &VoterStanding,
    prior: Option<PriorVote>,
    intent: VoteIntent,
    observed_duration: Option<f64>,
) -> Result<VoteOutcome, CoreError> {
    if voter.is_owner {
        return own_segment(segment, prior, intent);
    }

    if !voter.is_vip && !voter.has_matching_submission {
        return Err(CoreError::Policy(
            "Voting requires a live submission in the segment's category".to_string(),
        ));
    }

    if matches!(prior, Some(p) if p.code == intent.code()) {
        return Ok(VoteOutcome::no_effect());
    }

    let weight = if voter.is_vip {
        VIP_VOTE_WEIGHT
    } else {
        ORDINARY_VOTE_WEIGHT
    };
    let contribution = match intent {
        VoteIntent::Up => weight,
        VoteIntent::Down => -weight,
        _ => unreachable!("directional handles up/down only"),
    };

    // Replace the voter's previous contribution, if any, in the same step.
    let prior_delta = prior.map(|p| p.delta).unwrap_or(0);

    let mut outcome = VoteOutcome {
        vote_delta: contribution - prior_delta,
        set_locked: None,
        set_hidden: None,
        set_video_duration: None,
        record: RecordChange::Upsert {
            code: intent.code(),
            delta: contribution,
        },
    };

    // Lock state and vote count are independent axes for VIPs: an upvote
    // (re-)locks and unhides, a downvote unlocks.
    if voter.is_vip {
        match intent {
            VoteIntent::Up => {
                outcome.set_locked = Some(true);
                if segment.hidden {
                    outcome.set_hidden = Some(false);
                }
                if let Some(observed) = observed_duration {
                    let stale = segment.video_duration == 0.0
                        || duration_changed(segment.video_duration, observed);
                    if observed > 0.0 && stale {
                        outcome.set_video_duration = Some(observed);
                    }
                }
            }
            VoteIntent::Down => {
                if segment.locked {
                    outcome.set_locked = Some(false);
                }
            }
            _ => {}
        }
    }

    Ok(outcome)
}

/// A submitter may retire their own segment with a downvote, but cannot
/// boost it.
fn own_segment(
    segment: &SegmentVoteState,
    prior: Option<PriorVote>,
    intent: VoteIntent,
) -> Result<VoteOutcome, CoreError> {
    match intent {
        VoteIntent::Down => {
            if segment.votes <= DEAD_VOTE_THRESHOLD {
                return Ok(VoteOutcome::no_effect());
            }
            let prior_delta = prior.map(|p| p.delta).unwrap_or(0);
            let delta = DEAD_VOTE_THRESHOLD - segment.votes;
            Ok(VoteOutcome {
                vote_delta: delta,
                set_locked: None,
                set_hidden: None,
                set_video_duration: None,
                record: RecordChange::Upsert {
                    code: VoteIntent::Down.code(),
                    delta: delta + prior_delta,
                },
            })
        }
        VoteIntent::Up => Err(CoreError::Policy(
            "Submitters cannot upvote their own segments".to_string(),
        )),
        _ => unreachable!("own_segment handles up/down only"),
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fresh_segment() -> SegmentVoteState {
        SegmentVoteState {
            votes: 0,
            locked: false,
            hidden: false,
            category: Category::Sponsor,
            video_duration: 300.0,
        }
    }

    fn eligible_voter() -> VoterStanding {
        VoterStanding {
            has_matching_submission: true,
            ..VoterStanding::default()
        }
    }

    fn vip() -> VoterStanding {
        VoterStanding {
            is_vip: true,
            ..VoterStanding::default()
        }
    }

    // -- Intent codes --------------------------------------------------------

    #[test]
    fn intent_codes_round_trip() {
        for code in [0u8, 1, 20, 30] {
            assert_eq!(VoteIntent::from_code(code).unwrap().code(), code as i16);
        }
    }

    #[test]
    fn unknown_intent_code_rejected() {
        assert_matches!(VoteIntent::from_code(2), Err(CoreError::Validation(_)));
        assert_matches!(VoteIntent::from_code(255), Err(CoreError::Validation(_)));
    }

    // -- Eligibility ---------------------------------------------------------

    #[test]
    fn voter_without_matching_submission_rejected() {
        let voter = VoterStanding::default();
        let err = evaluate_vote(&fresh_segment(), &voter, None, VoteIntent::Up, None).unwrap_err();
        assert_matches!(err, CoreError::Policy(_));
    }

    #[test]
    fn vip_bypasses_eligibility() {
        let out = evaluate_vote(&fresh_segment(), &vip(), None, VoteIntent::Up, None).unwrap();
        assert_eq!(out.vote_delta, VIP_VOTE_WEIGHT);
    }

    #[test]
    fn warned_voter_rejected() {
        let voter = VoterStanding {
            has_active_warning: true,
            ..eligible_voter()
        };
        let err = evaluate_vote(&fresh_segment(), &voter, None, VoteIntent::Up, None).unwrap_err();
        assert_matches!(err, CoreError::Policy(msg) if msg == WARNED_VOTER_MESSAGE);
    }

    #[test]
    fn shadow_banned_vote_swallowed() {
        let voter = VoterStanding {
            is_shadow_banned: true,
            ..eligible_voter()
        };
        let out = evaluate_vote(&fresh_segment(), &voter, None, VoteIntent::Down, None).unwrap();
        assert!(out.is_no_effect());
    }

    // -- Weights and the dead asymmetry --------------------------------------

    #[test]
    fn ordinary_votes_move_by_one() {
        let up = evaluate_vote(&fresh_segment(), &eligible_voter(), None, VoteIntent::Up, None)
            .unwrap();
        assert_eq!(up.vote_delta, 1);
        let down = evaluate_vote(&fresh_segment(), &eligible_voter(), None, VoteIntent::Down, None)
            .unwrap();
        assert_eq!(down.vote_delta, -1);
    }

    #[test]
    fn single_ordinary_downvote_never_kills_a_fresh_segment() {
        let out = evaluate_vote(&fresh_segment(), &eligible_voter(), None, VoteIntent::Down, None)
            .unwrap();
        assert_eq!(fresh_segment().votes + out.vote_delta, -1);
    }

    #[test]
    fn vip_downvote_kills_a_fresh_segment_in_one_step() {
        let out = evaluate_vote(&fresh_segment(), &vip(), None, VoteIntent::Down, None).unwrap();
        assert_eq!(fresh_segment().votes + out.vote_delta, DEAD_VOTE_THRESHOLD);
    }

    #[test]
    fn vip_upvote_can_revive_a_dead_segment() {
        let mut seg = fresh_segment();
        seg.votes = -2;
        let out = evaluate_vote(&seg, &vip(), None, VoteIntent::Up, None).unwrap();
        assert_eq!(seg.votes + out.vote_delta, 0);
    }

    // -- Repeat / switch / undo ----------------------------------------------

    #[test]
    fn repeat_same_direction_is_a_no_op() {
        let prior = PriorVote { code: 1, delta: 1 };
        let out = evaluate_vote(&fresh_segment(), &eligible_voter(), Some(prior), VoteIntent::Up, None)
            .unwrap();
        assert!(out.is_no_effect());
    }

    #[test]
    fn switching_direction_replaces_the_prior_contribution() {
        // Upvoted (+1) earlier, now downvotes: the count moves by -2 but the
        // voter's recorded net contribution is -1.
        let prior = PriorVote { code: 1, delta: 1 };
        let out = evaluate_vote(&fresh_segment(), &eligible_voter(), Some(prior), VoteIntent::Down, None)
            .unwrap();
        assert_eq!(out.vote_delta, -2);
        assert_eq!(out.record, RecordChange::Upsert { code: 0, delta: -1 });
    }

    #[test]
    fn undo_reverts_the_recorded_delta_exactly() {
        let prior = PriorVote { code: 0, delta: -1 };
        let out = evaluate_vote(&fresh_segment(), &eligible_voter(), Some(prior), VoteIntent::Undo, None)
            .unwrap();
        assert_eq!(out.vote_delta, 1);
        assert_eq!(out.record, RecordChange::Remove);
    }

    #[test]
    fn undo_without_prior_vote_is_a_no_op() {
        let out = evaluate_vote(&fresh_segment(), &eligible_voter(), None, VoteIntent::Undo, None)
            .unwrap();
        assert!(out.is_no_effect());
    }

    // -- Owner behaviour -----------------------------------------------------

    #[test]
    fn owner_downvote_retires_the_segment() {
        let voter = VoterStanding {
            is_owner: true,
            ..VoterStanding::default()
        };
        let mut seg = fresh_segment();
        seg.votes = 3;
        let out = evaluate_vote(&seg, &voter, None, VoteIntent::Down, None).unwrap();
        assert_eq!(seg.votes + out.vote_delta, DEAD_VOTE_THRESHOLD);
    }

    #[test]
    fn owner_upvote_rejected() {
        let voter = VoterStanding {
            is_owner: true,
            ..VoterStanding::default()
        };
        let err = evaluate_vote(&fresh_segment(), &voter, None, VoteIntent::Up, None).unwrap_err();
        assert_matches!(err, CoreError::Policy(_));
    }

    // -- VIP side effects ----------------------------------------------------

    #[test]
    fn vip_upvote_locks_and_unhides() {
        let mut seg = fresh_segment();
        seg.hidden = true;
        let out = evaluate_vote(&seg, &vip(), None, VoteIntent::Up, None).unwrap();
        assert_eq!(out.set_locked, Some(true));
        assert_eq!(out.set_hidden, Some(false));
    }

    #[test]
    fn vip_downvote_unlocks() {
        let mut seg = fresh_segment();
        seg.locked = true;
        let out = evaluate_vote(&seg, &vip(), None, VoteIntent::Down, None).unwrap();
        assert_eq!(out.set_locked, Some(false));
    }

    #[test]
    fn vip_upvote_refreshes_stale_duration() {
        let seg = fresh_segment(); // snapshot 300.0
        let out = evaluate_vote(&seg, &vip(), None, VoteIntent::Up, Some(330.0)).unwrap();
        assert_eq!(out.set_video_duration, Some(330.0));

        let out = evaluate_vote(&seg, &vip(), None, VoteIntent::Up, Some(300.5)).unwrap();
        assert_eq!(out.set_video_duration, None);
    }

    #[test]
    fn ordinary_upvote_never_touches_lock_or_duration() {
        let mut seg = fresh_segment();
        seg.locked = true;
        let out = evaluate_vote(&seg, &eligible_voter(), None, VoteIntent::Up, Some(999.0)).unwrap();
        assert_eq!(out.set_locked, None);
        assert_eq!(out.set_video_duration, None);
    }

    // -- Malicious -----------------------------------------------------------

    fn chapter_segment() -> SegmentVoteState {
        SegmentVoteState {
            votes: 5,
            locked: false,
            hidden: false,
            category: Category::Chapter,
            video_duration: 300.0,
        }
    }

    #[test]
    fn malicious_only_applies_to_chapters() {
        let voter = VoterStanding {
            has_chapter_submission: true,
            ..VoterStanding::default()
        };
        let err = evaluate_vote(&fresh_segment(), &voter, None, VoteIntent::Malicious, None)
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn malicious_requires_a_chapter_submission() {
        let err = evaluate_vote(
            &chapter_segment(),
            &VoterStanding::default(),
            None,
            VoteIntent::Malicious,
            None,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Policy(_));
    }

    #[test]
    fn malicious_drives_straight_to_dead() {
        let voter = VoterStanding {
            has_chapter_submission: true,
            ..VoterStanding::default()
        };
        let seg = chapter_segment();
        let out = evaluate_vote(&seg, &voter, None, VoteIntent::Malicious, None).unwrap();
        assert_eq!(seg.votes + out.vote_delta, DEAD_VOTE_THRESHOLD);
        assert_eq!(out.record, RecordChange::Upsert { code: 30, delta: -7 });
    }

    #[test]
    fn malicious_on_dead_chapter_is_a_no_op() {
        let mut seg = chapter_segment();
        seg.votes = -2;
        let voter = VoterStanding {
            has_chapter_submission: true,
            ..VoterStanding::default()
        };
        let out = evaluate_vote(&seg, &voter, None, VoteIntent::Malicious, None).unwrap();
        assert!(out.is_no_effect());
    }
}
