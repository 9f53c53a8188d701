use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};
use votechain_ledger::{
    Block, ChainValidator, InMemoryLedger, LedgerError, LedgerReader, LedgerWriter, Tally,
    TallyBuilder,
};
use votechain_types::{ActorId, ChoiceId, Digest, Entry, SubjectId};

use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::gate::AdmissionGate;
use crate::guard::{DuplicateGuard, InMemoryDuplicateGuard};
use crate::notify::{BroadcastSink, LogSink, NotificationSink, TallyUpdate};
use crate::registry::{Choice, Subject, SubjectRegistry};
use crate::stage::AdmissionContext;

/// What the caller gets back for an accepted vote.
#[derive(Clone, Debug)]
pub struct CastReceipt {
    pub block: Block,
    /// Updated counts for the vote's subject, keyed by choice name.
    pub results: BTreeMap<String, u64>,
}

/// Named results for one registered subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubjectResults {
    pub subject_id: SubjectId,
    pub name: String,
    pub active: bool,
    pub results: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainStatus {
    pub length: u64,
    pub head_digest: Digest,
    pub valid: bool,
}

struct HostState {
    registry: SubjectRegistry,
    guard: Box<dyn DuplicateGuard>,
}

/// The only write path to the ledger.
///
/// Admission, append and notification happen under one mutex, so two
/// concurrent votes by the same actor in the same subject can never both land
/// on the chain.
pub struct VotingService {
    ledger: Arc<InMemoryLedger>,
    state: Mutex<HostState>,
    gate: AdmissionGate,
    sinks: Vec<Arc<dyn NotificationSink>>,
    broadcast: Option<Arc<BroadcastSink>>,
}

impl VotingService {
    /// Create a service over `ledger`, rebuilding the duplicate guard from
    /// the votes already on it.
    pub fn new(ledger: Arc<InMemoryLedger>, registry: SubjectRegistry) -> HostResult<Self> {
        let guard = InMemoryDuplicateGuard::from_blocks(&ledger.snapshot()?);
        Ok(Self::with_guard(ledger, registry, Box::new(guard)))
    }

    /// Create a service with a caller-supplied guard, used as is.
    pub fn with_guard(
        ledger: Arc<InMemoryLedger>,
        registry: SubjectRegistry,
        guard: Box<dyn DuplicateGuard>,
    ) -> Self {
        Self {
            ledger,
            state: Mutex::new(HostState { registry, guard }),
            gate: AdmissionGate::with_default_stages(),
            sinks: Vec::new(),
            broadcast: None,
        }
    }

    /// Registry from `config`, a log sink, and a broadcast sink sized by
    /// `notification_buffer`.
    pub fn from_config(config: &HostConfig, ledger: Arc<InMemoryLedger>) -> HostResult<Self> {
        let broadcast = Arc::new(BroadcastSink::new(config.notification_buffer));
        let mut service = Self::new(ledger, config.registry()?)?
            .with_sink(Arc::new(LogSink))
            .with_sink(broadcast.clone());
        service.broadcast = Some(broadcast);
        Ok(service)
    }

    /// Replace the admission pipeline.
    pub fn with_gate(mut self, gate: AdmissionGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Subscribe to tally updates, if the service was built with a
    /// broadcast sink.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<TallyUpdate>> {
        self.broadcast.as_ref().map(|b| b.subscribe())
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    /// Validate identifiers, admit, and append one vote.
    pub fn cast_vote(&self, actor: &str, subject: &str, choice: &str) -> HostResult<CastReceipt> {
        let entry = Entry::new(
            ActorId::new(actor)?,
            SubjectId::new(subject)?,
            ChoiceId::new(choice)?,
        );
        self.cast_entry(entry)
    }

    /// Admit and append `entry`, then notify every sink.
    ///
    /// Sinks run before the admission lock is released, so observers see
    /// updates in block order and each update reflects the chain exactly
    /// up to its own block.
    pub fn cast_entry(&self, entry: Entry) -> HostResult<CastReceipt> {
        let mut state = self.lock()?;
        let subject = entry.subject_id.clone();
        let block = self.admit_and_append(&mut state, entry)?;

        let chain = self.ledger.snapshot()?;
        let cut = chain.len().min(block.sequence as usize + 1);
        let tally = TallyBuilder::tally_blocks(&chain[..cut], &subject);
        let results = state.registry.name_results(&subject, &tally);

        let update = TallyUpdate {
            subject_id: subject,
            sequence: block.sequence,
            results: results.clone(),
        };
        for sink in &self.sinks {
            if let Err(err) = sink.notify(&update) {
                warn!(sink = sink.name(), error = %err, "notification failed");
            }
        }

        Ok(CastReceipt { block, results })
    }

    fn admit_and_append(&self, state: &mut HostState, entry: Entry) -> HostResult<Block> {
        let HostState { registry, guard } = state;

        let admission = {
            let mut context = AdmissionContext::new(registry, &**guard);
            self.gate.evaluate(&entry, &mut context)
        };
        if let Err(rejection) = admission.into_result() {
            warn!(actor = %entry.actor_id, subject = %entry.subject_id, %rejection, "vote rejected");
            return Err(rejection.into());
        }

        guard.check_and_set(&entry.actor_id, &entry.subject_id)?;
        let (actor, subject) = (entry.actor_id.clone(), entry.subject_id.clone());
        match self.ledger.append(entry) {
            Ok(block) => {
                info!(%actor, %subject, sequence = block.sequence, "vote accepted");
                Ok(block)
            }
            Err(err) => {
                guard.release(&actor, &subject);
                Err(err.into())
            }
        }
    }

    /// Current counts for `subject`, keyed by choice display name.
    pub fn results(&self, subject: &SubjectId) -> HostResult<BTreeMap<String, u64>> {
        let tally = self.ledger.tally(subject)?;
        Ok(self.lock()?.registry.name_results(subject, &tally))
    }

    /// Current counts for `subject`, keyed by choice id.
    pub fn raw_tally(&self, subject: &SubjectId) -> HostResult<Tally> {
        Ok(self.ledger.tally(subject)?)
    }

    /// Named results for every registered subject, from one snapshot.
    pub fn all_results(&self) -> HostResult<Vec<SubjectResults>> {
        let mut tallies = TallyBuilder::tally_all_blocks(&self.ledger.snapshot()?);
        let state = self.lock()?;
        Ok(state
            .registry
            .subjects()
            .map(|s| {
                let tally = tallies.remove(&s.id).unwrap_or_default();
                SubjectResults {
                    subject_id: s.id.clone(),
                    name: s.name.clone(),
                    active: s.active,
                    results: state.registry.name_results(&s.id, &tally),
                }
            })
            .collect())
    }

    /// Length, head and integrity, all read from one snapshot.
    pub fn chain_status(&self) -> HostResult<ChainStatus> {
        let chain = self.ledger.snapshot()?;
        let head = chain.last().ok_or(LedgerError::MissingGenesis)?;
        Ok(ChainStatus {
            length: chain.len() as u64,
            head_digest: head.digest,
            valid: ChainValidator::validate_blocks(&chain).is_valid(),
        })
    }

    pub fn snapshot(&self) -> HostResult<Vec<Block>> {
        Ok(self.ledger.snapshot()?)
    }

    pub fn register_subject(&self, subject: Subject) -> HostResult<()> {
        self.lock()?.registry.register(subject)
    }

    pub fn add_choice(&self, subject: &SubjectId, choice: Choice) -> HostResult<()> {
        self.lock()?.registry.add_choice(subject, choice)
    }

    /// Open or close a subject. Returns the previous state.
    pub fn set_active(&self, subject: &SubjectId, active: bool) -> HostResult<bool> {
        self.lock()?.registry.set_active(subject, active)
    }

    pub fn subjects(&self) -> HostResult<Vec<Subject>> {
        Ok(self.lock()?.registry.subjects().cloned().collect())
    }

    fn lock(&self) -> HostResult<MutexGuard<'_, HostState>> {
        self.state.lock().map_err(|_| HostError::LockPoisoned)
    }
}
