use std::collections::HashSet;

use votechain_ledger::Block;
use votechain_types::{ActorId, SubjectId};

use crate::error::Rejection;

/// At most one accepted vote per actor per subject.
///
/// Implementations are driven under the host's admission lock, so
/// `check_and_set` only has to be atomic with respect to itself.
pub trait DuplicateGuard: Send + Sync {
    fn contains(&self, actor: &ActorId, subject: &SubjectId) -> bool;

    /// Claim the `(actor, subject)` slot, failing if it is already taken.
    fn check_and_set(&mut self, actor: &ActorId, subject: &SubjectId) -> Result<(), Rejection>;

    /// Give back a slot claimed by a vote that never reached the chain.
    fn release(&mut self, actor: &ActorId, subject: &SubjectId);
}

/// `HashSet`-backed guard.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDuplicateGuard {
    cast: HashSet<(ActorId, SubjectId)>,
}

impl InMemoryDuplicateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the guard from every entry already on a chain.
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let cast = blocks
            .iter()
            .flat_map(Block::entries)
            .map(|e| (e.actor_id.clone(), e.subject_id.clone()))
            .collect();
        Self { cast }
    }

    pub fn len(&self) -> usize {
        self.cast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cast.is_empty()
    }
}

impl DuplicateGuard for InMemoryDuplicateGuard {
    fn contains(&self, actor: &ActorId, subject: &SubjectId) -> bool {
        self.cast.contains(&(actor.clone(), subject.clone()))
    }

    fn check_and_set(&mut self, actor: &ActorId, subject: &SubjectId) -> Result<(), Rejection> {
        if self.cast.insert((actor.clone(), subject.clone())) {
            Ok(())
        } else {
            Err(Rejection::AlreadyVoted {
                actor: actor.clone(),
                subject: subject.clone(),
            })
        }
    }

    fn release(&mut self, actor: &ActorId, subject: &SubjectId) {
        self.cast.remove(&(actor.clone(), subject.clone()));
    }
}
