//! Domain logic for the segment registry: closed category/action-type/vote
//! vocabularies, submission validation, the vote state machine, read-time
//! segment selection, and the archival predicate.
//!
//! Everything in this crate is pure: no database access, no I/O. The
//! `openskip-engine` crate loads state through `openskip-db` repositories,
//! asks this crate for a decision, and persists the outcome.

pub mod archival;
pub mod category;
pub mod category_vote;
pub mod error;
pub mod hashing;
pub mod selection;
pub mod submission;
pub mod types;
pub mod vote;
