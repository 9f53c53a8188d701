use votechain_crypto::{ChainError, HasherError};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("integrity violation: {0}")]
    Integrity(#[from] ChainError),

    #[error("append attempted out of order: expected sequence {expected}, got {found}")]
    SequenceMismatch { expected: u64, found: u64 },

    #[error("append attempted with mismatched previous digest")]
    ParentMismatch,

    #[error("chain has no genesis block")]
    MissingGenesis,

    #[error("malformed genesis block: {0}")]
    MalformedGenesis(String),

    #[error("hashing error: {0}")]
    Hasher(#[from] HasherError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unsupported archive format {0}")]
    UnsupportedFormat(u32),

    #[error("archive I/O error: {0}")]
    Io(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
