use votechain_types::{ChainLink, Digest};

use crate::hasher::HasherError;

/// Trait for blocks that participate in a hash chain.
pub trait ChainedBlock {
    /// Position of the block in its chain.
    fn sequence(&self) -> u64;
    /// The block's stored digest.
    fn digest(&self) -> Digest;
    /// The stored link to the previous block.
    fn previous(&self) -> ChainLink;
    /// Digest recomputed from the block's current fields.
    fn recompute_digest(&self) -> Result<Digest, HasherError>;
}

/// Hash chain integrity verifier.
///
/// The first block is the root of trust and is not checked against a
/// predecessor. Every later block must hash to its stored digest, link to
/// the digest of the block before it, and sit at the sequence matching its
/// position.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain, stopping at the first failure.
    pub fn verify_chain(blocks: &[impl ChainedBlock]) -> Result<(), ChainError> {
        for index in 1..blocks.len() {
            Self::verify_link(&blocks[index - 1], &blocks[index], index)?;
        }
        Ok(())
    }

    /// Verify one block against its predecessor.
    pub fn verify_link(
        previous: &impl ChainedBlock,
        block: &impl ChainedBlock,
        index: usize,
    ) -> Result<(), ChainError> {
        let computed = block
            .recompute_digest()
            .map_err(|source| ChainError::Unhashable { index, source })?;
        if computed != block.digest() {
            return Err(ChainError::HashMismatch { index });
        }

        if !block.previous().points_to(&previous.digest()) {
            return Err(ChainError::BrokenLink { index });
        }

        if block.sequence() != index as u64 {
            return Err(ChainError::SequenceGap {
                index,
                found: block.sequence(),
            });
        }

        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("data tampering at index {index}: computed digest differs from stored")]
    HashMismatch { index: usize },

    #[error("chain broken at index {index}: previous digest does not match")]
    BrokenLink { index: usize },

    #[error("sequence gap at index {index}: block claims sequence {found}")]
    SequenceGap { index: usize, found: u64 },

    #[error("block at index {index} could not be hashed: {source}")]
    Unhashable { index: usize, source: HasherError },
}

impl ChainError {
    /// Chain position of the failing block.
    pub fn index(&self) -> usize {
        match self {
            Self::HashMismatch { index }
            | Self::BrokenLink { index }
            | Self::SequenceGap { index, .. }
            | Self::Unhashable { index, .. } => *index,
        }
    }
}
