use std::time::{Duration, Instant};

use tracing::debug;
use votechain_types::Entry;

use crate::error::Rejection;
use crate::stage::{AdmissionContext, AdmissionStage, StageDecision, StageResult};
use crate::stages::{DuplicateStage, SubjectStage};

// ---------------------------------------------------------------------------
// AdmissionResult
// ---------------------------------------------------------------------------

/// The outcome of running a vote through the full pipeline.
#[derive(Clone, Debug)]
pub struct AdmissionResult {
    /// `None` when every stage passed.
    pub rejection: Option<Rejection>,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    pub elapsed: Duration,
}

impl AdmissionResult {
    pub fn is_admitted(&self) -> bool {
        self.rejection.is_none()
    }

    /// Convert into a `Result`, surfacing the rejection if there was one.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self.rejection {
            None => Ok(()),
            Some(rejection) => Err(rejection),
        }
    }
}

// ---------------------------------------------------------------------------
// AdmissionGate
// ---------------------------------------------------------------------------

/// Ordered pipeline of checks every vote passes before it may be appended.
pub struct AdmissionGate {
    stages: Vec<Box<dyn AdmissionStage>>,
}

impl AdmissionGate {
    /// An empty pipeline that admits everything.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Subject -> Duplicate
    pub fn with_default_stages() -> Self {
        let mut gate = Self::new();
        gate.add_stage(Box::new(SubjectStage));
        gate.add_stage(Box::new(DuplicateStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn AdmissionStage>) {
        self.stages.push(stage);
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Run `entry` through every stage.
    ///
    /// Fail-fast: the first rejecting stage ends evaluation.
    pub fn evaluate(&self, entry: &Entry, context: &mut AdmissionContext<'_>) -> AdmissionResult {
        let pipeline_start = Instant::now();
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(entry, context);

            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Reject(rejection) => Some(rejection.to_string()),
                },
                elapsed: stage_start.elapsed(),
            };
            stage_results.push(result.clone());
            context.previous_stages.push(result);

            if let StageDecision::Reject(rejection) = decision {
                debug!(stage = stage.name(), %rejection, "vote rejected");
                return AdmissionResult {
                    rejection: Some(rejection),
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                };
            }
        }

        AdmissionResult {
            rejection: None,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        }
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::with_default_stages()
    }
}
