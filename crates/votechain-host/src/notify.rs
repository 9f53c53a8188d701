use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;
use votechain_types::SubjectId;

use crate::error::HostResult;

/// Tally snapshot pushed to observers after an accepted vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TallyUpdate {
    pub subject_id: SubjectId,
    /// Sequence of the block that produced this update.
    pub sequence: u64,
    /// Counts keyed by choice display name.
    pub results: BTreeMap<String, u64>,
}

/// Receives tally updates once a vote is on the chain.
///
/// Sinks run under the admission lock, one block at a time in block order.
/// They should return quickly. A failing sink is logged and does not undo
/// the vote.
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    fn notify(&self, update: &TallyUpdate) -> HostResult<()>;
}

/// Fans updates out to any number of in-process subscribers.
pub struct BroadcastSink {
    tx: broadcast::Sender<TallyUpdate>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TallyUpdate> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl NotificationSink for BroadcastSink {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn notify(&self, update: &TallyUpdate) -> HostResult<()> {
        // No subscribers is not a failure.
        let _ = self.tx.send(update.clone());
        Ok(())
    }
}

/// Writes every update to the tracing log.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, update: &TallyUpdate) -> HostResult<()> {
        info!(
            subject = %update.subject_id,
            sequence = update.sequence,
            results = ?update.results,
            "tally updated"
        );
        Ok(())
    }
}

pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn name(&self) -> &str {
        "noop"
    }

    fn notify(&self, _update: &TallyUpdate) -> HostResult<()> {
        Ok(())
    }
}
