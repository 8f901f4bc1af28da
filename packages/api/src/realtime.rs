//! Real-time broadcast snapshots via long polling.

use dioxus::prelude::*;
use engivia_core::{BroadcastId, SnapshotBatch};

/// Snapshots of a broadcast newer than `after`.
///
/// Waits up to the hub's poll timeout for a change and answers with an empty
/// batch if none arrives. Pass `0` to receive the current state.
#[post("/api/realtime/broadcast")]
pub async fn poll_broadcast(id: BroadcastId, after: u64) -> Result<SnapshotBatch, ServerFnError> {
    #[cfg(feature = "server")]
    {
        let server = crate::auth::server::state().await?;
        actors::poll_broadcast(&server.hub, id, after, server.hub_config.poll_timeout)
            .await
            .map_err(|e| {
                tracing::warn!("Broadcast poll failed: {}", e);
                ServerFnError::new(e.to_string())
            })
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}
