//! Cryptographic primitives for VoteChain.
//!
//! Provides domain-separated SHA-256 hashing, the canonical byte encoding of
//! a block, and hash chain verification.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod canonical;
pub mod chain;
pub mod hasher;

pub use canonical::{block_digest, BlockFields, NONCE};
pub use chain::{ChainError, ChainedBlock, HashChainVerifier};
pub use hasher::{ContentHasher, HasherError};
