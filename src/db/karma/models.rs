//! Karma ledger models.

/// Result of applying a delta to a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KarmaUpdate {
    /// Score after the delta was applied.
    pub score: i64,
    /// Whether the channel's notify threshold was hit by this score.
    pub notify: bool,
}

/// One line of a rank listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub word: String,
    pub score: i64,
}
