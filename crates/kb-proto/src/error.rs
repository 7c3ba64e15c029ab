//! Error types for the message grammar.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtoError`].
pub type Result<T, E = ProtoError> = std::result::Result<T, E>;

/// Errors raised when converting grammar keywords from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtoError {
    /// The operation keyword is not one of set/get/del/delete/rank.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The group keyword is not a known command group.
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// The text is not a `<@id>` user mention.
    #[error("invalid mention: {0}")]
    InvalidMention(String),
}
