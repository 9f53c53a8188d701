use thiserror::Error;
use votechain_ledger::LedgerError;
use votechain_types::{ActorId, ChoiceId, SubjectId, TypeError};

/// Why a vote was refused admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unknown subject {0}")]
    UnknownSubject(SubjectId),

    #[error("subject {0} is not accepting votes")]
    InactiveSubject(SubjectId),

    #[error("choice {choice} is not permitted in subject {subject}")]
    ChoiceNotPermitted { subject: SubjectId, choice: ChoiceId },

    #[error("actor {actor} has already voted in subject {subject}")]
    AlreadyVoted { actor: ActorId, subject: SubjectId },

    #[error("rejected by stage '{stage}': {reason}")]
    Stage { stage: String, reason: String },
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("vote rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("subject {0} is already registered")]
    DuplicateSubject(SubjectId),

    #[error("choice {choice} already exists in subject {subject}")]
    DuplicateChoice { subject: SubjectId, choice: ChoiceId },

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] TypeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("host state lock poisoned")]
    LockPoisoned,
}

pub type HostResult<T> = Result<T, HostError>;
