use std::time::Duration;

use votechain_types::Entry;

use crate::error::Rejection;
use crate::guard::DuplicateGuard;
use crate::registry::SubjectRegistry;

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single admission stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The vote must not reach the ledger.
    Reject(Rejection),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<Result<(), Rejection>> for StageDecision {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::Pass,
            Err(rejection) => Self::Reject(rejection),
        }
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated on rejection.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// AdmissionContext
// ---------------------------------------------------------------------------

/// Host state visible to every stage.
///
/// Borrowed from inside the service's admission lock, so nothing a stage
/// reads can change before the vote is appended.
pub struct AdmissionContext<'a> {
    pub registry: &'a SubjectRegistry,
    pub guard: &'a dyn DuplicateGuard,
    /// Results from stages that have already run in this evaluation.
    pub previous_stages: Vec<StageResult>,
}

impl<'a> AdmissionContext<'a> {
    pub fn new(registry: &'a SubjectRegistry, guard: &'a dyn DuplicateGuard) -> Self {
        Self {
            registry,
            guard,
            previous_stages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AdmissionStage trait
// ---------------------------------------------------------------------------

/// A single check in the admission pipeline.
///
/// Stages run in order and must not mutate host state; the service claims
/// the duplicate-guard slot itself once every stage has passed.
pub trait AdmissionStage: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, entry: &Entry, context: &AdmissionContext<'_>) -> StageDecision;
}
