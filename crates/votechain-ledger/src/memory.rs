use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, warn};
use votechain_crypto::{ChainError, HashChainVerifier};
use votechain_types::{BlockPayload, ChainLink, Entry, SubjectId, Timestamp};

use crate::block::Block;
use crate::error::LedgerError;
use crate::tally::{Tally, TallyBuilder};
use crate::traits::{LedgerReader, LedgerWriter};

/// Vestigial proof-of-work difficulty. Recorded, never enforced.
pub const DEFAULT_DIFFICULTY: u32 = 1;

/// In-memory vote chain.
///
/// Appends take the write lock for the whole read-head/push step, so a
/// reader never observes a half-built block and two appends can never claim
/// the same sequence number.
#[derive(Debug)]
pub struct InMemoryLedger {
    difficulty: u32,
    inner: RwLock<Vec<Block>>,
}

impl InMemoryLedger {
    /// Create a ledger holding a freshly generated genesis block.
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_genesis(Block::genesis(Timestamp::now())?)
    }

    /// Create a ledger rooted at a caller-supplied genesis block.
    pub fn with_genesis(genesis: Block) -> Result<Self, LedgerError> {
        check_genesis(&genesis)?;
        Ok(Self {
            difficulty: DEFAULT_DIFFICULTY,
            inner: RwLock::new(vec![genesis]),
        })
    }

    /// Rebuild a ledger from an exported block sequence.
    ///
    /// The sequence must start with a well-formed genesis block and pass full
    /// chain verification; nothing is repaired.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, LedgerError> {
        let genesis = blocks.first().ok_or(LedgerError::MissingGenesis)?;
        check_genesis(genesis)?;
        HashChainVerifier::verify_chain(&blocks)?;
        debug!(blocks = blocks.len(), "ledger restored");
        Ok(Self {
            difficulty: DEFAULT_DIFFICULTY,
            inner: RwLock::new(blocks),
        })
    }

    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Walk the chain and report whether every block is intact and linked.
    ///
    /// Stops at the first failure and logs what was found.
    pub fn is_valid(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(LedgerError::Integrity(err)) => {
                match &err {
                    ChainError::HashMismatch { index } => {
                        warn!(sequence = index, "data tampering detected: invalid digest")
                    }
                    ChainError::BrokenLink { index } => {
                        warn!(sequence = index, "chain broken: invalid previous digest")
                    }
                    other => warn!(error = %other, "chain verification failed"),
                }
                false
            }
            Err(other) => {
                error!(error = %other, "chain could not be verified");
                false
            }
        }
    }

    /// Like [`Self::is_valid`], but returns the first failure.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let chain = self.read()?;
        HashChainVerifier::verify_chain(chain.as_slice())?;
        Ok(())
    }

    /// Count votes per choice for `subject`.
    pub fn tally(&self, subject: &SubjectId) -> Result<Tally, LedgerError> {
        let chain = self.read()?;
        Ok(TallyBuilder::tally_blocks(&chain, subject))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Block>>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Block>>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    fn push_block(chain: &mut Vec<Block>, block: Block) -> Result<(), LedgerError> {
        let expected = chain.len() as u64;
        if block.sequence != expected {
            return Err(LedgerError::SequenceMismatch {
                expected,
                found: block.sequence,
            });
        }

        let head = chain.last().ok_or(LedgerError::MissingGenesis)?;
        if !block.previous_digest.points_to(&head.digest) {
            return Err(LedgerError::ParentMismatch);
        }

        chain.push(block);
        Ok(())
    }
}

impl LedgerWriter for InMemoryLedger {
    fn append(&self, entry: Entry) -> Result<Block, LedgerError> {
        let mut chain = self.write()?;
        let head = chain.last().ok_or(LedgerError::MissingGenesis)?;

        let block = Block::create_at(
            chain.len() as u64,
            BlockPayload::single(entry),
            ChainLink::Block(head.digest),
            Timestamp::next_after(&head.timestamp),
        )?;
        Self::push_block(&mut chain, block.clone())?;

        debug!(
            sequence = block.sequence,
            digest = %block.digest.short_hex(),
            "block appended"
        );
        Ok(block)
    }
}

impl LedgerReader for InMemoryLedger {
    fn head(&self) -> Result<Block, LedgerError> {
        let chain = self.read()?;
        chain.last().cloned().ok_or(LedgerError::MissingGenesis)
    }

    fn block_count(&self) -> Result<u64, LedgerError> {
        Ok(self.read()?.len() as u64)
    }

    fn get(&self, sequence: u64) -> Result<Option<Block>, LedgerError> {
        let chain = self.read()?;
        let Ok(index) = usize::try_from(sequence) else {
            return Ok(None);
        };
        Ok(chain.get(index).cloned())
    }

    fn snapshot(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.read()?.clone())
    }
}

fn check_genesis(block: &Block) -> Result<(), LedgerError> {
    if !block.is_genesis() {
        return Err(LedgerError::MalformedGenesis(
            "expected sequence 0, root link, and genesis payload".into(),
        ));
    }
    if !block.verify_digest() {
        return Err(LedgerError::MalformedGenesis("digest mismatch".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::thread;

    use votechain_types::{ActorId, ChoiceId, Digest};

    use super::*;

    fn vote(actor: &str, subject: &str, choice: &str) -> Entry {
        Entry::new(
            ActorId::new(actor).unwrap(),
            SubjectId::new(subject).unwrap(),
            ChoiceId::new(choice).unwrap(),
        )
    }

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id).unwrap()
    }

    fn choice(id: &str) -> ChoiceId {
        ChoiceId::new(id).unwrap()
    }

    fn ledger_with_votes(count: usize) -> InMemoryLedger {
        let ledger = InMemoryLedger::new().unwrap();
        for i in 0..count {
            ledger
                .append(vote(&format!("u{i}"), "e1", &format!("c{}", i % 2)))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn fresh_ledger_holds_only_genesis() {
        let ledger = InMemoryLedger::new().unwrap();
        assert_eq!(ledger.block_count().unwrap(), 1);
        assert!(ledger.head().unwrap().is_genesis());
        assert!(ledger.is_valid());
        assert_eq!(ledger.difficulty(), DEFAULT_DIFFICULTY);
    }

    #[test]
    fn first_append_links_to_genesis() {
        let ledger = InMemoryLedger::new().unwrap();
        let genesis = ledger.head().unwrap();

        let block = ledger.append(vote("u1", "e1", "c1")).unwrap();
        assert_eq!(block.sequence, 1);
        assert_eq!(block.previous_digest, ChainLink::Block(genesis.digest));
        assert_eq!(block.entries().len(), 1);
        assert_eq!(ledger.head().unwrap(), block);
    }

    #[test]
    fn appended_chains_are_valid() {
        let ledger = ledger_with_votes(25);
        assert_eq!(ledger.block_count().unwrap(), 26);
        assert!(ledger.is_valid());
        ledger.verify().unwrap();

        let chain = ledger.snapshot().unwrap();
        for (i, block) in chain.iter().enumerate() {
            assert_eq!(block.sequence, i as u64);
        }
        for pair in chain.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn tampering_with_entry_is_detected() {
        let ledger = ledger_with_votes(3);
        {
            let mut chain = ledger.inner.write().unwrap();
            if let BlockPayload::Entries(entries) = &mut chain[2].payload {
                entries[0].choice_id = choice("c-forged");
            }
        }
        assert!(!ledger.is_valid());
        assert_eq!(
            ledger.verify().unwrap_err(),
            LedgerError::Integrity(ChainError::HashMismatch { index: 2 })
        );
    }

    #[test]
    fn tampering_with_any_field_is_detected() {
        let tamperings: [fn(&mut Block); 6] = [
            |b: &mut Block| b.sequence += 10,
            |b: &mut Block| b.timestamp = Timestamp::new(b.timestamp.unix_ms + 1, 0),
            |b: &mut Block| b.nonce = 42,
            |b: &mut Block| b.previous_digest = ChainLink::Block(Digest::from_bytes([5; 32])),
            |b: &mut Block| b.digest = Digest::from_bytes([6; 32]),
            |b: &mut Block| b.payload = BlockPayload::Entries(vec![]),
        ];
        for tamper in tamperings {
            let ledger = ledger_with_votes(3);
            tamper(&mut ledger.inner.write().unwrap()[1]);
            assert!(!ledger.is_valid());
        }
    }

    #[test]
    fn swapping_adjacent_blocks_is_detected() {
        let ledger = ledger_with_votes(4);
        ledger.inner.write().unwrap().swap(2, 3);
        assert!(!ledger.is_valid());
        assert_eq!(
            ledger.verify().unwrap_err(),
            LedgerError::Integrity(ChainError::BrokenLink { index: 2 })
        );
    }

    #[test]
    fn removing_a_block_is_detected() {
        let ledger = ledger_with_votes(4);
        ledger.inner.write().unwrap().remove(2);
        assert!(!ledger.is_valid());
    }

    #[test]
    fn push_block_rejects_wrong_sequence_and_parent() {
        let ledger = ledger_with_votes(1);
        let mut chain = ledger.inner.write().unwrap();
        let head = chain.last().unwrap().digest;

        let stale = Block::create(1, BlockPayload::Genesis, ChainLink::Block(head)).unwrap();
        assert_eq!(
            InMemoryLedger::push_block(&mut chain, stale).unwrap_err(),
            LedgerError::SequenceMismatch {
                expected: 2,
                found: 1
            }
        );

        let orphan = Block::create(2, BlockPayload::Genesis, ChainLink::Root).unwrap();
        assert_eq!(
            InMemoryLedger::push_block(&mut chain, orphan).unwrap_err(),
            LedgerError::ParentMismatch
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn tally_counts_only_matching_subject() {
        let ledger = InMemoryLedger::new().unwrap();
        for (actor, c) in [("u1", "A"), ("u2", "A"), ("u3", "B"), ("u4", "A"), ("u5", "B")] {
            ledger.append(vote(actor, "e1", c)).unwrap();
        }
        ledger.append(vote("u6", "e2", "A")).unwrap();

        let tally = ledger.tally(&subject("e1")).unwrap();
        let expected: BTreeMap<_, _> = [(choice("A"), 3), (choice("B"), 2)].into();
        assert_eq!(tally, expected);

        assert_eq!(ledger.tally(&subject("e1")).unwrap(), tally);
        assert!(ledger.tally(&subject("missing")).unwrap().is_empty());
    }

    #[test]
    fn get_returns_block_by_sequence() {
        let ledger = ledger_with_votes(2);
        assert_eq!(ledger.get(2).unwrap().unwrap().sequence, 2);
        assert!(ledger.get(3).unwrap().is_none());
        assert!(ledger.get(u64::MAX).unwrap().is_none());
    }

    #[test]
    fn from_blocks_accepts_exported_chain() {
        let ledger = ledger_with_votes(5);
        let restored = InMemoryLedger::from_blocks(ledger.snapshot().unwrap()).unwrap();
        assert_eq!(restored.snapshot().unwrap(), ledger.snapshot().unwrap());
        assert!(restored.is_valid());

        restored.append(vote("late", "e1", "c0")).unwrap();
        assert!(restored.is_valid());
    }

    #[test]
    fn from_blocks_rejects_bad_input() {
        assert_eq!(
            InMemoryLedger::from_blocks(vec![]).unwrap_err(),
            LedgerError::MissingGenesis
        );

        let mut blocks = ledger_with_votes(3).snapshot().unwrap();
        blocks.remove(0);
        assert!(matches!(
            InMemoryLedger::from_blocks(blocks).unwrap_err(),
            LedgerError::MalformedGenesis(_)
        ));

        let mut blocks = ledger_with_votes(3).snapshot().unwrap();
        blocks[3].nonce = 9;
        assert_eq!(
            InMemoryLedger::from_blocks(blocks).unwrap_err(),
            LedgerError::Integrity(ChainError::HashMismatch { index: 3 })
        );
    }

    #[test]
    fn concurrent_appends_are_serialized() {
        let ledger = Arc::new(InMemoryLedger::new().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..25 {
                        ledger
                            .append(vote(&format!("t{t}-{i}"), "e1", "c1"))
                            .unwrap();
                        assert!(ledger.is_valid());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.block_count().unwrap(), 201);
        assert!(ledger.is_valid());
        assert_eq!(ledger.tally(&subject("e1")).unwrap()[&choice("c1")], 200);
    }
}
