//! Category-change voting.
//!
//! A category vote is a vote for an alternate category rather than for or
//! against the segment itself. Each distinct voter contributes one count
//! to a candidate category; the effective category flips only once a
//! candidate pulls far enough ahead of the current category's own tally.

use crate::category::{ActionType, Category};
use crate::error::CoreError;
use crate::vote::{VoterStanding, WARNED_VOTER_MESSAGE};

/// Votes a candidate category must lead the current category by to flip.
pub const CATEGORY_FLIP_MARGIN: i32 = 2;

/// What the engine should do with an authorized category vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryVoteAuthorization {
    /// Accepted with no effect (shadow-banned voter, or a VIP re-voting
    /// for the category the segment already has).
    NoEffect,
    /// Count one vote for the candidate, then check the flip margin.
    Tally,
    /// VIP vote: commit the category change unconditionally.
    Commit,
}

/// Authorize a category vote against the target segment.
///
/// `destination_locked` reports whether `(video, target_category)` is
/// covered by a category lock.
pub fn authorize_category_vote(
    voter: &VoterStanding,
    segment_locked: bool,
    segment_action: ActionType,
    current: Category,
    target: Category,
    destination_locked: bool,
) -> Result<CategoryVoteAuthorization, CoreError> {
    if voter.has_active_warning {
        return Err(CoreError::Policy(WARNED_VOTER_MESSAGE.to_string()));
    }
    if voter.is_shadow_banned {
        return Ok(CategoryVoteAuthorization::NoEffect);
    }

    // A category change must preserve the segment's action type; crossing
    // into a category that cannot express it would change what clients do
    // with the time range.
    if !target.allowed_action_types().contains(&segment_action) {
        return Err(CoreError::Validation(format!(
            "Category '{target}' does not allow action type '{segment_action}'"
        )));
    }

    if voter.is_vip {
        return Ok(if target == current {
            CategoryVoteAuthorization::NoEffect
        } else {
            CategoryVoteAuthorization::Commit
        });
    }

    if segment_locked {
        return Err(CoreError::Policy(
            "The segment's category is locked".to_string(),
        ));
    }
    if destination_locked {
        return Err(CoreError::Policy(format!(
            "Category '{target}' is locked for this video"
        )));
    }

    // A vote for the current category reinforces it: the tally raises the
    // bar competing candidates must clear.
    Ok(CategoryVoteAuthorization::Tally)
}

/// Whether the candidate's tally has pulled far enough ahead of the
/// current category's tally to commit the change.
pub fn should_flip(candidate_tally: i32, current_tally: i32) -> bool {
    candidate_tally - current_tally >= CATEGORY_FLIP_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn voter() -> VoterStanding {
        VoterStanding::default()
    }

    #[test]
    fn flip_margin_sequence() {
        // Competing tallies (candidate, current): the change commits only
        // once the candidate leads by the margin.
        assert!(!should_flip(1, 1));
        assert!(!should_flip(2, 2));
        assert!(should_flip(3, 0));
        assert!(!should_flip(1, 0));
        assert!(should_flip(2, 0));
        assert!(!should_flip(3, 2));
    }

    #[test]
    fn ordinary_vote_tallies() {
        let auth = authorize_category_vote(
            &voter(),
            false,
            ActionType::Skip,
            Category::Sponsor,
            Category::Outro,
            false,
        )
        .unwrap();
        assert_eq!(auth, CategoryVoteAuthorization::Tally);
    }

    #[test]
    fn vote_for_current_category_reinforces_it() {
        let auth = authorize_category_vote(
            &voter(),
            false,
            ActionType::Skip,
            Category::Sponsor,
            Category::Sponsor,
            false,
        )
        .unwrap();
        assert_eq!(auth, CategoryVoteAuthorization::Tally);
    }

    #[test]
    fn locked_segment_rejects_ordinary_category_votes() {
        let err = authorize_category_vote(
            &voter(),
            true,
            ActionType::Skip,
            Category::Sponsor,
            Category::Outro,
            false,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Policy(_));
    }

    #[test]
    fn locked_destination_rejects_ordinary_category_votes() {
        let err = authorize_category_vote(
            &voter(),
            false,
            ActionType::Skip,
            Category::Sponsor,
            Category::Outro,
            true,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Policy(_));
    }

    #[test]
    fn vip_commits_unconditionally_and_bypasses_locks() {
        let vip = VoterStanding {
            is_vip: true,
            ..VoterStanding::default()
        };
        let auth = authorize_category_vote(
            &vip,
            true,
            ActionType::Skip,
            Category::Sponsor,
            Category::Outro,
            true,
        )
        .unwrap();
        assert_eq!(auth, CategoryVoteAuthorization::Commit);
    }

    #[test]
    fn action_type_incompatible_target_rejected() {
        // A skip segment cannot become a chapter.
        let err = authorize_category_vote(
            &voter(),
            false,
            ActionType::Skip,
            Category::Sponsor,
            Category::Chapter,
            false,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn shadow_banned_category_vote_swallowed() {
        let banned = VoterStanding {
            is_shadow_banned: true,
            ..VoterStanding::default()
        };
        let auth = authorize_category_vote(
            &banned,
            false,
            ActionType::Skip,
            Category::Sponsor,
            Category::Outro,
            false,
        )
        .unwrap();
        assert_eq!(auth, CategoryVoteAuthorization::NoEffect);
    }

    #[test]
    fn warned_category_vote_rejected() {
        let warned = VoterStanding {
            has_active_warning: true,
            ..VoterStanding::default()
        };
        let err = authorize_category_vote(
            &warned,
            false,
            ActionType::Skip,
            Category::Sponsor,
            Category::Outro,
            false,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Policy(_));
    }
}
