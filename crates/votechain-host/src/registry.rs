use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use votechain_ledger::Tally;
use votechain_types::{ChoiceId, SubjectId};

use crate::error::{HostError, HostResult, Rejection};

/// A permitted value within a subject, e.g. a candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub name: String,
}

/// An election or category that votes are cast in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

fn default_active() -> bool {
    true
}

impl Subject {
    /// An active subject with no choices yet.
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            active: true,
            choices: Vec::new(),
        }
    }

    pub fn with_choice(mut self, id: ChoiceId, name: impl Into<String>) -> Self {
        self.choices.push(Choice {
            id,
            name: name.into(),
        });
        self
    }

    pub fn choice(&self, id: &ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|c| &c.id == id)
    }
}

/// The set of subjects and the choices each one permits.
///
/// The ledger never consults this; the host must reject inadmissible
/// subject/choice pairs before appending.
#[derive(Clone, Debug, Default)]
pub struct SubjectRegistry {
    subjects: BTreeMap<SubjectId, Subject>,
}

impl SubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, subject: Subject) -> HostResult<()> {
        if self.subjects.contains_key(&subject.id) {
            return Err(HostError::DuplicateSubject(subject.id));
        }
        let mut seen = Vec::with_capacity(subject.choices.len());
        for choice in &subject.choices {
            if seen.contains(&&choice.id) {
                return Err(HostError::DuplicateChoice {
                    subject: subject.id.clone(),
                    choice: choice.id.clone(),
                });
            }
            seen.push(&choice.id);
        }
        self.subjects.insert(subject.id.clone(), subject);
        Ok(())
    }

    pub fn add_choice(&mut self, subject: &SubjectId, choice: Choice) -> HostResult<()> {
        let entry = self
            .subjects
            .get_mut(subject)
            .ok_or_else(|| Rejection::UnknownSubject(subject.clone()))?;
        if entry.choice(&choice.id).is_some() {
            return Err(HostError::DuplicateChoice {
                subject: subject.clone(),
                choice: choice.id,
            });
        }
        entry.choices.push(choice);
        Ok(())
    }

    /// Open or close a subject for voting. Returns the previous state.
    pub fn set_active(&mut self, subject: &SubjectId, active: bool) -> HostResult<bool> {
        let entry = self
            .subjects
            .get_mut(subject)
            .ok_or_else(|| Rejection::UnknownSubject(subject.clone()))?;
        Ok(std::mem::replace(&mut entry.active, active))
    }

    pub fn get(&self, subject: &SubjectId) -> Option<&Subject> {
        self.subjects.get(subject)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    pub fn active_subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values().filter(|s| s.active)
    }

    /// Check that `choice` may be recorded in `subject` right now.
    pub fn check_admissible(
        &self,
        subject: &SubjectId,
        choice: &ChoiceId,
    ) -> Result<&Subject, Rejection> {
        let entry = self
            .subjects
            .get(subject)
            .ok_or_else(|| Rejection::UnknownSubject(subject.clone()))?;
        if !entry.active {
            return Err(Rejection::InactiveSubject(subject.clone()));
        }
        if entry.choice(choice).is_none() {
            return Err(Rejection::ChoiceNotPermitted {
                subject: subject.clone(),
                choice: choice.clone(),
            });
        }
        Ok(entry)
    }

    /// Display name of a choice, if registered.
    pub fn choice_name(&self, subject: &SubjectId, choice: &ChoiceId) -> Option<&str> {
        self.get(subject)?.choice(choice).map(|c| c.name.as_str())
    }

    /// Re-key a tally by choice display name, falling back to the raw id.
    pub fn name_results(&self, subject: &SubjectId, tally: &Tally) -> BTreeMap<String, u64> {
        tally
            .iter()
            .map(|(choice, count)| {
                let name = self
                    .choice_name(subject, choice)
                    .map(str::to_owned)
                    .unwrap_or_else(|| choice.to_string());
                (name, *count)
            })
            .collect()
    }
}
