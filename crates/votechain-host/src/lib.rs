//! Host services for VoteChain.
//!
//! The ledger records whatever it is handed. This crate decides what it is
//! handed: every vote passes an admission pipeline (subject registry, then
//! duplicate guard) and is appended under the same lock, after which the
//! updated tally is pushed to notification sinks.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use votechain_host::{HostConfig, VotingService};
//! use votechain_ledger::InMemoryLedger;
//!
//! let config = HostConfig::demo().unwrap();
//! let ledger = Arc::new(InMemoryLedger::new().unwrap());
//! let service = VotingService::from_config(&config, ledger).unwrap();
//! let receipt = service.cast_vote("u1", "e1", "c1").unwrap();
//! assert_eq!(receipt.block.sequence, 1);
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod guard;
pub mod notify;
pub mod registry;
pub mod service;
pub mod stage;
pub mod stages;

pub use config::HostConfig;
pub use error::{HostError, HostResult, Rejection};
pub use gate::{AdmissionGate, AdmissionResult};
pub use guard::{DuplicateGuard, InMemoryDuplicateGuard};
pub use notify::{BroadcastSink, LogSink, NoOpSink, NotificationSink, TallyUpdate};
pub use registry::{Choice, Subject, SubjectRegistry};
pub use service::{CastReceipt, ChainStatus, SubjectResults, VotingService};
pub use stage::{AdmissionContext, AdmissionStage, StageDecision, StageResult};
pub use stages::{DuplicateStage, SubjectStage};
