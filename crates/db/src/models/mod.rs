//! Row models and insert DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row, plus plain create DTOs for inserts. Category
//! and action-type columns are stored as their wire strings and parsed
//! into the closed `openskip-core` enums at the engine boundary.

pub mod branding;
pub mod category_vote;
pub mod lock_category;
pub mod moderation;
pub mod segment;
pub mod vote_record;
