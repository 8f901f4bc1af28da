//! Realtime broadcast subscriptions.
//!
//! This crate provides the Ractor-based actors that follow a broadcast
//! document and deliver its snapshots in order.
//!
//! # Architecture
//!
//! - `SubscriptionActor` - Owns one snapshot stream, numbers and retains snapshots
//! - `BroadcastSubscription` - Cancellable handle over a subscription actor
//! - `SubscriptionHub` - Shares subscriptions between long-polling clients
//!
//! # Usage
//!
//! ```ignore
//! use actors::{HubConfig, LiveBroadcastSource, poll_broadcast, start_hub};
//!
//! let config = HubConfig::default();
//! let (hub, _handle) = start_hub(LiveBroadcastSource, config.clone()).await?;
//! let batch = poll_broadcast(&hub, id, 0, config.poll_timeout).await?;
//! ```

mod hub;
mod messages;
mod source;
mod subscription;

pub use hub::{HubConfig, SubscriptionHub, poll_broadcast, start_hub};
pub use messages::{HubMessage, SubscriptionMessage};
pub use source::{LiveBroadcastSource, SnapshotSource, SnapshotStream, SubscribeError};
pub use subscription::{
    BroadcastSubscription, DEFAULT_LOG_CAPACITY, Sequencer, SubscriptionActor, SubscriptionOptions,
};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
