use serde::{Deserialize, Serialize};

use crate::identity::{ActorId, ChoiceId, SubjectId};
use crate::temporal::Timestamp;

/// Sentinel carried by the genesis block in place of entries.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// One recorded vote.
///
/// The timestamp is informational: it is covered by the block digest but
/// never used for ordering or validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub actor_id: ActorId,
    pub subject_id: SubjectId,
    pub choice_id: ChoiceId,
    pub timestamp: Timestamp,
}

impl Entry {
    /// Create an entry stamped with the current time.
    pub fn new(actor_id: ActorId, subject_id: SubjectId, choice_id: ChoiceId) -> Self {
        Self::with_timestamp(actor_id, subject_id, choice_id, Timestamp::now())
    }

    pub fn with_timestamp(
        actor_id: ActorId,
        subject_id: SubjectId,
        choice_id: ChoiceId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            actor_id,
            subject_id,
            choice_id,
            timestamp,
        }
    }
}

/// What a block carries: the genesis sentinel or an ordered list of entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum BlockPayload {
    Genesis,
    Entries(Vec<Entry>),
}

impl BlockPayload {
    /// Payload holding a single entry.
    pub fn single(entry: Entry) -> Self {
        Self::Entries(vec![entry])
    }

    /// The entries in this payload; empty for genesis.
    pub fn entries(&self) -> &[Entry] {
        match self {
            Self::Genesis => &[],
            Self::Entries(entries) => entries,
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis)
    }
}
