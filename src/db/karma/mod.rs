//! Karma ledger repository.
//!
//! Handles per-channel scores, cross-channel aggregation and rankings.

pub mod models;
pub mod queries;

pub use models::{KarmaUpdate, RankEntry};
pub use queries::KarmaRepository;
