//! Canonical byte encoding of a block.
//!
//! A block is encoded as the compact JSON array
//!
//! ```text
//! [sequence, previous_digest, timestamp_ms, timestamp_logical, nonce, payload]
//! ```
//!
//! where `previous_digest` is the lowercase hex digest of the predecessor (or
//! `"0"` for genesis) and `payload` is either the string `"Genesis Block"` or
//! an array of `[actor_id, subject_id, choice_id, timestamp_ms,
//! timestamp_logical]` tuples. Only arrays are used, so there is no key order
//! or whitespace that could differ between two encoders of the same block.

use serde::Serialize;
use votechain_types::{BlockPayload, ChainLink, Digest, Timestamp, GENESIS_MARKER};

use crate::hasher::{ContentHasher, HasherError};

/// Nonce value folded into every digest. Mining is not performed.
pub const NONCE: u64 = 0;

/// Borrowed view of the fields a block digest covers.
#[derive(Clone, Copy, Debug)]
pub struct BlockFields<'a> {
    pub sequence: u64,
    pub previous: &'a ChainLink,
    pub timestamp: &'a Timestamp,
    pub nonce: u64,
    pub payload: &'a BlockPayload,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CanonicalPayload<'a> {
    Marker(&'static str),
    Entries(Vec<(&'a str, &'a str, &'a str, u64, u32)>),
}

impl<'a> From<&'a BlockPayload> for CanonicalPayload<'a> {
    fn from(payload: &'a BlockPayload) -> Self {
        match payload {
            BlockPayload::Genesis => Self::Marker(GENESIS_MARKER),
            BlockPayload::Entries(entries) => Self::Entries(
                entries
                    .iter()
                    .map(|e| {
                        (
                            e.actor_id.as_str(),
                            e.subject_id.as_str(),
                            e.choice_id.as_str(),
                            e.timestamp.unix_ms,
                            e.timestamp.logical,
                        )
                    })
                    .collect(),
            ),
        }
    }
}

type CanonicalForm<'a> = (u64, String, u64, u32, u64, CanonicalPayload<'a>);

fn canonical_form<'a>(fields: &BlockFields<'a>) -> CanonicalForm<'a> {
    (
        fields.sequence,
        fields.previous.to_string(),
        fields.timestamp.unix_ms,
        fields.timestamp.logical,
        fields.nonce,
        CanonicalPayload::from(fields.payload),
    )
}

/// Compute the block digest over the canonical encoding.
pub fn block_digest(fields: &BlockFields<'_>) -> Result<Digest, HasherError> {
    ContentHasher::BLOCK.hash_json(&canonical_form(fields))
}
