/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Segments are identified by a globally unique, immutable UUID.
pub type SegmentUuid = uuid::Uuid;

/// Vote count at or below which a segment is dead (retired but kept for audit).
pub const DEAD_VOTE_THRESHOLD: i32 = -2;
