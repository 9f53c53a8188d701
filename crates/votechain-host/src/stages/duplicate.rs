use votechain_types::Entry;

use crate::error::Rejection;
use crate::stage::{AdmissionContext, AdmissionStage, StageDecision};

/// One vote per actor per subject.
///
/// Read-only early exit. The authoritative claim happens in
/// [`crate::VotingService::cast_vote`] under the same lock.
pub struct DuplicateStage;

impl AdmissionStage for DuplicateStage {
    fn name(&self) -> &str {
        "duplicate"
    }

    fn evaluate(&self, entry: &Entry, context: &AdmissionContext<'_>) -> StageDecision {
        if context.guard.contains(&entry.actor_id, &entry.subject_id) {
            return StageDecision::Reject(Rejection::AlreadyVoted {
                actor: entry.actor_id.clone(),
                subject: entry.subject_id.clone(),
            });
        }
        StageDecision::Pass
    }
}

#[cfg(test)]
mod tests {
    use votechain_types::{ActorId, ChoiceId, SubjectId};

    use super::*;
    use crate::guard::{DuplicateGuard, InMemoryDuplicateGuard};
    use crate::registry::SubjectRegistry;

    #[test]
    fn rejects_actor_already_recorded() {
        let registry = SubjectRegistry::new();
        let mut guard = InMemoryDuplicateGuard::new();
        let actor = ActorId::new("u1").unwrap();
        let subject = SubjectId::new("e1").unwrap();
        let entry = Entry::new(actor.clone(), subject.clone(), ChoiceId::new("c1").unwrap());

        {
            let ctx = AdmissionContext::new(&registry, &guard);
            assert!(DuplicateStage.evaluate(&entry, &ctx).is_pass());
        }

        guard.check_and_set(&actor, &subject).unwrap();
        let ctx = AdmissionContext::new(&registry, &guard);
        assert!(matches!(
            DuplicateStage.evaluate(&entry, &ctx),
            StageDecision::Reject(Rejection::AlreadyVoted { .. })
        ));
    }
}
