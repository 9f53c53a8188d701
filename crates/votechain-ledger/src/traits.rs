use votechain_types::Entry;

use crate::block::Block;
use crate::error::LedgerError;

/// Write boundary for ledger append operations.
pub trait LedgerWriter: Send + Sync {
    /// Seal `entry` into a new block at the head of the chain.
    ///
    /// The caller is responsible for admitting the entry first.
    fn append(&self, entry: Entry) -> Result<Block, LedgerError>;
}

/// Read boundary for ledger queries.
pub trait LedgerReader: Send + Sync {
    /// The most recently appended block (genesis on a fresh ledger).
    fn head(&self) -> Result<Block, LedgerError>;

    /// Number of blocks including genesis.
    fn block_count(&self) -> Result<u64, LedgerError>;

    fn get(&self, sequence: u64) -> Result<Option<Block>, LedgerError>;

    /// Copy of the full chain, genesis first.
    fn snapshot(&self) -> Result<Vec<Block>, LedgerError>;
}
