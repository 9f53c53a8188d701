use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::block::Block;
use crate::error::LedgerError;
use crate::memory::InMemoryLedger;
use crate::traits::LedgerReader;

/// Current archive layout version.
pub const ARCHIVE_FORMAT: u32 = 1;

/// Portable export of a full chain.
///
/// Every block is stored with its `digest` and `previous_digest`, so
/// validity can be recomputed after reload. The ledger itself never touches
/// disk; hosts that want persistence go through this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainArchive {
    pub format: u32,
    pub difficulty: u32,
    pub blocks: Vec<Block>,
}

impl ChainArchive {
    /// Capture the current chain of `ledger`.
    pub fn capture(ledger: &InMemoryLedger) -> Result<Self, LedgerError> {
        Ok(Self {
            format: ARCHIVE_FORMAT,
            difficulty: ledger.difficulty(),
            blocks: ledger.snapshot()?,
        })
    }

    /// Rebuild a verified ledger from this archive.
    pub fn into_ledger(self) -> Result<InMemoryLedger, LedgerError> {
        if self.format != ARCHIVE_FORMAT {
            return Err(LedgerError::UnsupportedFormat(self.format));
        }
        Ok(InMemoryLedger::from_blocks(self.blocks)?.with_difficulty(self.difficulty))
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Write the archive to `path`, replacing any existing file.
    ///
    /// The JSON is written to a sibling `.tmp` file first and renamed into
    /// place, so a crash never leaves a half-written archive behind.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = self.to_json()?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| LedgerError::Io(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| LedgerError::Io(e.to_string()))?;
        info!(path = %path.display(), blocks = self.blocks.len(), "chain archive saved");
        Ok(())
    }

    /// Read an archive from `path` without verifying it.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let json = fs::read_to_string(path).map_err(|e| LedgerError::Io(e.to_string()))?;
        let archive = Self::from_json(&json)?;
        info!(path = %path.display(), blocks = archive.blocks.len(), "chain archive loaded");
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use votechain_crypto::ChainError;
    use votechain_types::{ActorId, ChoiceId, Entry, SubjectId};

    use super::*;
    use crate::traits::LedgerWriter;

    fn ledger_with_votes(count: usize) -> InMemoryLedger {
        let ledger = InMemoryLedger::new().unwrap();
        for i in 0..count {
            ledger
                .append(Entry::new(
                    ActorId::new(format!("u{i}")).unwrap(),
                    SubjectId::new("e1").unwrap(),
                    ChoiceId::new("c1").unwrap(),
                ))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn save_and_load_restores_valid_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        let ledger = ledger_with_votes(3).with_difficulty(4);

        ChainArchive::capture(&ledger).unwrap().save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());

        let restored = ChainArchive::load(&path).unwrap().into_ledger().unwrap();
        assert!(restored.is_valid());
        assert_eq!(restored.difficulty(), 4);
        assert_eq!(restored.snapshot().unwrap(), ledger.snapshot().unwrap());
    }

    #[test]
    fn archive_json_exposes_digests_and_links() {
        let ledger = ledger_with_votes(1);
        let json = ChainArchive::capture(&ledger).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let blocks = value["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["previous_digest"], "0");
        assert_eq!(blocks[1]["previous_digest"], blocks[0]["digest"]);
        assert_eq!(blocks[1]["digest"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn tampered_archive_is_rejected_on_reload() {
        let ledger = ledger_with_votes(2);
        let mut archive = ChainArchive::capture(&ledger).unwrap();
        if let votechain_types::BlockPayload::Entries(entries) = &mut archive.blocks[1].payload {
            entries[0].choice_id = ChoiceId::new("c2").unwrap();
        }

        let json = archive.to_json().unwrap();
        let err = ChainArchive::from_json(&json)
            .unwrap()
            .into_ledger()
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Integrity(ChainError::HashMismatch { index: 1 })
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut archive = ChainArchive::capture(&ledger_with_votes(0)).unwrap();
        archive.format = 99;
        assert_eq!(
            archive.into_ledger().unwrap_err(),
            LedgerError::UnsupportedFormat(99)
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChainArchive::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
