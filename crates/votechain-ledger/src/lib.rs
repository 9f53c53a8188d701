//! Append-only vote ledger for VoteChain.
//!
//! This crate is the heart of VoteChain. It provides:
//! - Hash-linked [`Block`]s with a SHA-256 digest over their canonical encoding
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - [`InMemoryLedger`], the single-writer chain behind a read/write lock
//! - Chain validation (short-circuit check and full diagnostic report)
//! - Tallies of votes per subject
//! - JSON archives for hosts that persist the chain

pub mod archive;
pub mod block;
pub mod error;
pub mod memory;
pub mod tally;
pub mod traits;
pub mod validation;

pub use archive::{ChainArchive, ARCHIVE_FORMAT};
pub use block::Block;
pub use error::LedgerError;
pub use memory::{InMemoryLedger, DEFAULT_DIFFICULTY};
pub use tally::{Tally, TallyBuilder};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
