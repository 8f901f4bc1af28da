//! Where broadcast snapshots come from.

use std::future::Future;
use std::pin::Pin;

use engivia_core::{Broadcast, BroadcastId};
use futures_util::{Stream, StreamExt};
use thiserror::Error;

/// Errors from opening or following a snapshot stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("Snapshot store error: {0}")]
    Store(String),
    #[error("Subscription closed")]
    Closed,
    #[error("Failed to spawn subscription: {0}")]
    Spawn(String),
}

impl From<db::DbError> for SubscribeError {
    fn from(error: db::DbError) -> Self {
        SubscribeError::Store(error.to_string())
    }
}

/// States of one broadcast in store emission order. `None` means absent.
pub type SnapshotStream =
    Pin<Box<dyn Stream<Item = Result<Option<Broadcast>, SubscribeError>> + Send>>;

/// Opens snapshot streams for broadcast ids.
pub trait SnapshotSource: Send + Sync + 'static {
    fn open(
        &self,
        broadcast_id: &BroadcastId,
    ) -> impl Future<Output = Result<SnapshotStream, SubscribeError>> + Send;
}

/// Snapshots from SurrealDB live queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveBroadcastSource;

impl SnapshotSource for LiveBroadcastSource {
    fn open(
        &self,
        broadcast_id: &BroadcastId,
    ) -> impl Future<Output = Result<SnapshotStream, SubscribeError>> + Send {
        let broadcast_id = broadcast_id.clone();
        async move {
            let updates = db::live::watch_broadcast(&broadcast_id).await?;
            Ok(updates
                .map(|item| item.map_err(SubscribeError::from))
                .boxed())
        }
    }
}
