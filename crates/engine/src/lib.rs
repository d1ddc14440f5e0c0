//! Orchestration services for the segment registry.
//!
//! Each service loads state through `openskip-db` repositories, asks
//! `openskip-core` for a decision, and persists the outcome. Shared
//! process state (pool, metadata source, advisory caches) lives in
//! [`state::ServiceState`]; the archival sweep runs as a background task.

pub mod archival;
pub mod error;
pub mod metadata;
pub mod moderation;
pub mod selection;
pub mod state;
pub mod submission;
pub mod vote;
