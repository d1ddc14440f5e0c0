//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement invariants run
//! inside a transaction, either owned by the repository or composed from
//! the `*_inner` helpers by the engine's moderation cascade.

pub mod archived_segment_repo;
pub mod branding_repo;
pub mod category_vote_repo;
pub mod engine_config_repo;
pub mod lock_category_repo;
pub mod segment_repo;
pub mod shadow_ban_repo;
pub mod vip_user_repo;
pub mod vote_record_repo;
pub mod warning_repo;

pub use archived_segment_repo::ArchivedSegmentRepo;
pub use branding_repo::BrandingRepo;
pub use category_vote_repo::CategoryVoteRepo;
pub use engine_config_repo::EngineConfigRepo;
pub use lock_category_repo::LockCategoryRepo;
pub use segment_repo::SegmentRepo;
pub use shadow_ban_repo::ShadowBanRepo;
pub use vip_user_repo::VipUserRepo;
pub use vote_record_repo::VoteRecordRepo;
pub use warning_repo::WarningRepo;
