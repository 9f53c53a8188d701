use serde::{Deserialize, Serialize};
use votechain_crypto::{block_digest, BlockFields, ChainedBlock, HasherError, NONCE};
use votechain_types::{BlockPayload, ChainLink, Digest, Entry, Timestamp};

/// One link in the chain.
///
/// `digest` covers every other field. A block is built once by the ledger
/// and never changed afterwards; callers only ever see copies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub sequence: u64,
    pub timestamp: Timestamp,
    pub payload: BlockPayload,
    pub previous_digest: ChainLink,
    pub nonce: u64,
    pub digest: Digest,
}

impl Block {
    /// Build a block stamped with the current time and seal its digest.
    pub fn create(
        sequence: u64,
        payload: BlockPayload,
        previous_digest: ChainLink,
    ) -> Result<Self, HasherError> {
        Self::create_at(sequence, payload, previous_digest, Timestamp::now())
    }

    /// Build a block with an explicit timestamp and seal its digest.
    pub fn create_at(
        sequence: u64,
        payload: BlockPayload,
        previous_digest: ChainLink,
        timestamp: Timestamp,
    ) -> Result<Self, HasherError> {
        let digest = block_digest(&BlockFields {
            sequence,
            previous: &previous_digest,
            timestamp: &timestamp,
            nonce: NONCE,
            payload: &payload,
        })?;
        Ok(Self {
            sequence,
            timestamp,
            payload,
            previous_digest,
            nonce: NONCE,
            digest,
        })
    }

    /// The root block: sequence 0, root link, sentinel payload.
    pub fn genesis(timestamp: Timestamp) -> Result<Self, HasherError> {
        Self::create_at(0, BlockPayload::Genesis, ChainLink::Root, timestamp)
    }

    pub fn entries(&self) -> &[Entry] {
        self.payload.entries()
    }

    pub fn is_genesis(&self) -> bool {
        self.sequence == 0 && self.previous_digest.is_root() && self.payload.is_genesis()
    }

    /// Returns `true` if the stored digest matches the block's fields.
    pub fn verify_digest(&self) -> bool {
        matches!(self.recompute_digest(), Ok(d) if d == self.digest)
    }
}

impl ChainedBlock for Block {
    fn sequence(&self) -> u64 {
        self.sequence
    }

    fn digest(&self) -> Digest {
        self.digest
    }

    fn previous(&self) -> ChainLink {
        self.previous_digest
    }

    fn recompute_digest(&self) -> Result<Digest, HasherError> {
        block_digest(&BlockFields {
            sequence: self.sequence,
            previous: &self.previous_digest,
            timestamp: &self.timestamp,
            nonce: self.nonce,
            payload: &self.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use votechain_types::{ActorId, ChoiceId, SubjectId};

    use super::*;

    fn vote(choice: &str) -> Entry {
        Entry::with_timestamp(
            ActorId::new("u1").unwrap(),
            SubjectId::new("e1").unwrap(),
            ChoiceId::new(choice).unwrap(),
            Timestamp::new(10, 0),
        )
    }

    #[test]
    fn genesis_shape() {
        let genesis = Block::genesis(Timestamp::new(1, 0)).unwrap();
        assert_eq!(genesis.sequence, 0);
        assert!(genesis.previous_digest.is_root());
        assert!(genesis.entries().is_empty());
        assert!(genesis.is_genesis());
        assert!(genesis.verify_digest());
    }

    #[test]
    fn identical_inputs_produce_identical_digests() {
        let prev = ChainLink::Block(Digest::from_bytes([1; 32]));
        let ts = Timestamp::new(50, 0);
        let a = Block::create_at(1, BlockPayload::single(vote("c1")), prev, ts).unwrap();
        let b = Block::create_at(1, BlockPayload::single(vote("c1")), prev, ts).unwrap();
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn any_field_change_changes_digest() {
        let prev = ChainLink::Block(Digest::from_bytes([1; 32]));
        let ts = Timestamp::new(50, 0);
        let base = Block::create_at(1, BlockPayload::single(vote("c1")), prev, ts).unwrap();

        let variants = [
            Block::create_at(2, BlockPayload::single(vote("c1")), prev, ts).unwrap(),
            Block::create_at(1, BlockPayload::single(vote("c2")), prev, ts).unwrap(),
            Block::create_at(
                1,
                BlockPayload::single(vote("c1")),
                ChainLink::Block(Digest::from_bytes([2; 32])),
                ts,
            )
            .unwrap(),
            Block::create_at(1, BlockPayload::single(vote("c1")), prev, Timestamp::new(51, 0))
                .unwrap(),
        ];
        for variant in &variants {
            assert_ne!(variant.digest, base.digest);
        }
    }

    #[test]
    fn mutation_after_creation_breaks_digest() {
        let mut block =
            Block::create(1, BlockPayload::single(vote("c1")), ChainLink::Root).unwrap();
        assert!(block.verify_digest());
        block.nonce = 1;
        assert!(!block.verify_digest());
    }

    #[test]
    fn block_json_roundtrip_keeps_digest_valid() {
        let block = Block::create(3, BlockPayload::single(vote("c9")), ChainLink::Root).unwrap();
        let json = serde_json::to_string(&block).unwrap();
        let parsed: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, block);
        assert!(parsed.verify_digest());
    }
}
