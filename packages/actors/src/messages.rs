//! Message types for actor communication.

use engivia_core::{Broadcast, BroadcastId, SnapshotBatch};
use ractor::RpcReplyPort;

use crate::source::SubscribeError;
use crate::subscription::BroadcastSubscription;

/// Messages for a [`SubscriptionActor`](crate::SubscriptionActor).
#[derive(Debug)]
pub enum SubscriptionMessage {
    /// Next item from the snapshot stream, forwarded by the pump task.
    Item(Result<Option<Broadcast>, SubscribeError>),

    /// The snapshot stream ended.
    Ended,

    /// Snapshots newer than `after`. Held until one arrives if there are none.
    Poll {
        after: u64,
        reply: RpcReplyPort<SnapshotBatch>,
    },
}

/// Messages for the [`SubscriptionHub`](crate::SubscriptionHub).
#[derive(Debug)]
pub enum HubMessage {
    /// Long-poll one broadcast, subscribing to it if needed.
    Poll {
        broadcast_id: BroadcastId,
        after: u64,
        reply: RpcReplyPort<Result<SnapshotBatch, SubscribeError>>,
    },

    /// A subscription opened for the hub finished starting. Polls that
    /// arrived meanwhile are answered once it is in place.
    Opened {
        broadcast_id: BroadcastId,
        result: Result<BroadcastSubscription, SubscribeError>,
    },

    /// Ids with a running subscription.
    ListActive {
        reply: RpcReplyPort<Vec<BroadcastId>>,
    },

    /// Stop the subscription for a broadcast, if any.
    Unsubscribe { broadcast_id: BroadcastId },

    /// Stop every subscription and the hub.
    Shutdown,

    /// Periodic tick for idle sweeps.
    Tick,
}
