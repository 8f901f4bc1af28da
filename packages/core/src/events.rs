//! Snapshot types for realtime broadcast updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Broadcast;

/// One observed state of a subscribed broadcast document.
///
/// `broadcast` is `None` when the document does not exist (or was deleted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastSnapshot {
    /// Position in the subscription's emission order, starting at 1.
    pub seq: u64,
    pub broadcast: Option<Broadcast>,
    pub observed_at: DateTime<Utc>,
}

/// Snapshots newer than a client's last seen sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBatch {
    /// In emission order.
    pub snapshots: Vec<BroadcastSnapshot>,
    /// The client fell behind the retained log; only the newest snapshots
    /// are included.
    #[serde(default)]
    pub lagged: bool,
}

impl SnapshotBatch {
    /// Sequence number to poll after next, given the previous cursor.
    pub fn next_cursor(&self, previous: u64) -> u64 {
        self.snapshots.last().map_or(previous, |s| s.seq)
    }

    /// The newest snapshot in the batch.
    pub fn latest(&self) -> Option<&BroadcastSnapshot> {
        self.snapshots.last()
    }
}
