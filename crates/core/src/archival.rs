//! Archival predicate for permanently-downvoted segments.
//!
//! Segments old enough and voted low enough, unless administratively
//! locked, are relocated from the live table to cold storage. The policy
//! is purely additive to the archive and purely subtractive from live
//! storage; it never mutates vote counts.

use chrono::Duration;

use crate::types::Timestamp;

/// Default age a segment must exceed before it can be archived, in days.
pub const DEFAULT_ARCHIVE_DAY_LIMIT: i64 = 20;

/// Default vote ceiling: only segments strictly below this are archived.
pub const DEFAULT_ARCHIVE_VOTE_LIMIT: i32 = 0;

/// Tunables for one archival sweep.
#[derive(Debug, Clone, Copy)]
pub struct ArchivePolicy {
    pub day_limit: i64,
    pub vote_limit: i32,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        ArchivePolicy {
            day_limit: DEFAULT_ARCHIVE_DAY_LIMIT,
            vote_limit: DEFAULT_ARCHIVE_VOTE_LIMIT,
        }
    }
}

impl ArchivePolicy {
    /// The submission-time cutoff: rows submitted before this are old
    /// enough to archive.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        now - Duration::days(self.day_limit)
    }
}

/// Whether one segment satisfies the archival predicate at `now`.
pub fn should_archive(
    time_submitted: Timestamp,
    votes: i32,
    locked: bool,
    now: Timestamp,
    policy: &ArchivePolicy,
) -> bool {
    !locked && votes < policy.vote_limit && time_submitted < policy.cutoff(now)
}
