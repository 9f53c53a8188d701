use votechain_crypto::ChainedBlock;

use crate::block::Block;
use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of a full chain validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub block_count: u64,
    pub genesis_valid: bool,
    pub digests_valid: bool,
    pub links_valid: bool,
    pub sequence_monotonic: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Position in the chain of the offending block.
    pub index: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    MissingGenesis,
    MalformedGenesis,
    DigestMismatch,
    BrokenLink,
    SequenceGap,
}

/// Diagnostic validator.
///
/// Unlike [`crate::InMemoryLedger::is_valid`], which stops at the first
/// failure, this walks the whole chain and records every violation.
pub struct ChainValidator;

impl ChainValidator {
    pub fn validate<R: LedgerReader>(reader: &R) -> Result<ValidationReport, LedgerError> {
        Ok(Self::validate_blocks(&reader.snapshot()?))
    }

    pub fn validate_blocks(blocks: &[Block]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut genesis_valid = true;
        let mut digests_valid = true;
        let mut links_valid = true;
        let mut sequence_monotonic = true;

        match blocks.first() {
            None => {
                genesis_valid = false;
                violations.push(Violation {
                    index: 0,
                    kind: ViolationKind::MissingGenesis,
                    description: "chain is empty".into(),
                });
            }
            Some(genesis) if !genesis.is_genesis() => {
                genesis_valid = false;
                violations.push(Violation {
                    index: 0,
                    kind: ViolationKind::MalformedGenesis,
                    description: format!(
                        "first block has sequence {} and link {}",
                        genesis.sequence, genesis.previous_digest
                    ),
                });
            }
            Some(_) => {}
        }

        for (index, block) in blocks.iter().enumerate() {
            let position = index as u64;

            if block.sequence != position {
                sequence_monotonic = false;
                violations.push(Violation {
                    index: position,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected sequence {position}, got {}", block.sequence),
                });
            }

            match block.recompute_digest() {
                Ok(computed) if computed == block.digest => {}
                Ok(computed) => {
                    digests_valid = false;
                    violations.push(Violation {
                        index: position,
                        kind: ViolationKind::DigestMismatch,
                        description: format!(
                            "stored {} but computed {}",
                            block.digest.short_hex(),
                            computed.short_hex()
                        ),
                    });
                }
                Err(err) => {
                    digests_valid = false;
                    violations.push(Violation {
                        index: position,
                        kind: ViolationKind::DigestMismatch,
                        description: err.to_string(),
                    });
                }
            }

            if index > 0 && !block.previous_digest.points_to(&blocks[index - 1].digest) {
                links_valid = false;
                violations.push(Violation {
                    index: position,
                    kind: ViolationKind::BrokenLink,
                    description: "previous digest link mismatch".into(),
                });
            }
        }

        ValidationReport {
            block_count: blocks.len() as u64,
            genesis_valid,
            digests_valid,
            links_valid,
            sequence_monotonic,
            violations,
        }
    }
}
