use std::collections::BTreeMap;

use votechain_types::{ChoiceId, SubjectId};

use crate::block::Block;
use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Vote count per choice for one subject.
pub type Tally = BTreeMap<ChoiceId, u64>;

/// Read-side aggregation over the chain.
///
/// Every call rescans the chain, so a tally can never lag behind the blocks
/// it was computed from.
pub struct TallyBuilder;

impl TallyBuilder {
    pub fn tally<R: LedgerReader>(reader: &R, subject: &SubjectId) -> Result<Tally, LedgerError> {
        let blocks = reader.snapshot()?;
        Ok(Self::tally_blocks(&blocks, subject))
    }

    /// Tallies for every subject that has at least one vote.
    pub fn tally_all<R: LedgerReader>(
        reader: &R,
    ) -> Result<BTreeMap<SubjectId, Tally>, LedgerError> {
        let blocks = reader.snapshot()?;
        Ok(Self::tally_all_blocks(&blocks))
    }

    /// Count entries for `subject`, skipping the genesis block.
    pub fn tally_blocks(blocks: &[Block], subject: &SubjectId) -> Tally {
        let mut tally = Tally::new();
        for entry in blocks.iter().skip(1).flat_map(Block::entries) {
            if &entry.subject_id == subject {
                *tally.entry(entry.choice_id.clone()).or_insert(0) += 1;
            }
        }
        tally
    }

    pub fn tally_all_blocks(blocks: &[Block]) -> BTreeMap<SubjectId, Tally> {
        let mut tallies: BTreeMap<SubjectId, Tally> = BTreeMap::new();
        for entry in blocks.iter().skip(1).flat_map(Block::entries) {
            *tallies
                .entry(entry.subject_id.clone())
                .or_default()
                .entry(entry.choice_id.clone())
                .or_insert(0) += 1;
        }
        tallies
    }
}
