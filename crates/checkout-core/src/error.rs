//! Error types for the ledger core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Why a candidate block cannot follow its predecessor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("previous hash mismatch: expected {expected:?}, got {actual:?}")]
    LinkMismatch { expected: String, actual: String },

    #[error("stored hash does not match contents of block {position}")]
    HashMismatch { position: u64 },

    #[error("invalid block position: expected {expected}, got {actual}")]
    PositionGap { expected: u64, actual: u64 },
}

/// Result of auditing a full chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain contains no blocks")]
    Empty,

    #[error("first block is not a well-formed genesis block")]
    BadGenesis,

    #[error("block {position} does not extend its predecessor: {source}")]
    BrokenLink {
        position: u64,
        source: ExtensionError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The candidate was discarded; the chain is unchanged.
    #[error("block rejected: {0}")]
    InvalidExtension(#[from] ExtensionError),

    /// The chain lost its genesis block. Never expected at runtime.
    #[error("chain has no tail block")]
    EmptyChain,
}
