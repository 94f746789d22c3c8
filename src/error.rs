//! Error type for the splitting pipeline.

use thiserror::Error;

use crate::list::TokenId;

/// Errors surfaced by splitting a block.
///
/// Ordinary input never fails: empty text yields no tokens and a missing
/// language tag falls back to a default. The variants below are either a
/// lifecycle misuse or a broken internal invariant, and both abort the whole
/// call.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The block was already split and has not been reverted.
    #[error("block is already split; revert it before splitting again")]
    AlreadySplit,

    /// A pass addressed a token that had already been unlinked.
    #[error("token {0:?} is no longer linked")]
    StaleToken(TokenId),

    /// Token texts no longer concatenate to the normalized source.
    #[error("token texts do not cover the source: expected {expected:?}, found {found:?}")]
    CoverageMismatch { expected: String, found: String },

    /// Malformed JSON configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SplitError>;
