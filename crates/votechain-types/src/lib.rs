//! Foundation types for VoteChain.
//!
//! This crate provides the identifier, digest, temporal, and entry types used
//! throughout the VoteChain workspace. Every other VoteChain crate depends on
//! `votechain-types`.
//!
//! # Key Types
//!
//! - [`ActorId`], [`SubjectId`], [`ChoiceId`] — Validated string identifiers
//! - [`Digest`] — 32-byte SHA-256 block digest, hex-encoded on the wire
//! - [`ChainLink`] — A block's reference to its predecessor (or the root)
//! - [`Timestamp`] — Monotonic wall-clock timestamp with a logical counter
//! - [`Entry`] — One recorded vote
//! - [`BlockPayload`] — Either the genesis sentinel or a list of entries

pub mod digest;
pub mod entry;
pub mod error;
pub mod identity;
pub mod temporal;

pub use digest::{ChainLink, Digest};
pub use entry::{BlockPayload, Entry, GENESIS_MARKER};
pub use error::TypeError;
pub use identity::{ActorId, ChoiceId, SubjectId};
pub use temporal::Timestamp;
