use votechain_types::Entry;

use crate::stage::{AdmissionContext, AdmissionStage, StageDecision};

/// Registry check.
///
/// The subject must exist and be open, and the choice must be one the
/// subject lists.
pub struct SubjectStage;

impl AdmissionStage for SubjectStage {
    fn name(&self) -> &str {
        "subject"
    }

    fn evaluate(&self, entry: &Entry, context: &AdmissionContext<'_>) -> StageDecision {
        context
            .registry
            .check_admissible(&entry.subject_id, &entry.choice_id)
            .map(|_| ())
            .into()
    }
}
