use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use votechain_ledger::DEFAULT_DIFFICULTY;
use votechain_types::{ChoiceId, SubjectId};

use crate::error::{HostError, HostResult};
use crate::registry::{Subject, SubjectRegistry};

/// Host configuration, usually read from a TOML file.
///
/// ```toml
/// notification_buffer = 128
///
/// [[subjects]]
/// id = "e1"
/// name = "Board election"
///
/// [[subjects.choices]]
/// id = "c1"
/// name = "Alice"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Recorded in archives only; blocks are never mined.
    pub difficulty: u32,
    /// Capacity of the broadcast channel used for tally updates.
    pub notification_buffer: usize,
    pub subjects: Vec<Subject>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            notification_buffer: 64,
            subjects: Vec::new(),
        }
    }
}

impl HostConfig {
    pub fn from_toml_str(raw: &str) -> HostResult<Self> {
        toml::from_str(raw).map_err(|e| HostError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> HostResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> HostResult<String> {
        toml::to_string_pretty(self).map_err(|e| HostError::Config(e.to_string()))
    }

    /// Build a registry from the configured subjects.
    pub fn registry(&self) -> HostResult<SubjectRegistry> {
        let mut registry = SubjectRegistry::new();
        for subject in &self.subjects {
            registry.register(subject.clone())?;
        }
        Ok(registry)
    }

    /// One open subject `e1` with choices `c1` and `c2`.
    pub fn demo() -> HostResult<Self> {
        let subject = Subject::new(SubjectId::new("e1")?, "Demo election")
            .with_choice(ChoiceId::new("c1")?, "Candidate One")
            .with_choice(ChoiceId::new("c2")?, "Candidate Two");
        Ok(Self {
            subjects: vec![subject],
            ..Self::default()
        })
    }
}
