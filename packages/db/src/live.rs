//! Live snapshots of a single broadcast document.
//!
//! A watch yields the document's current state first and then every change.
//! `None` means the document does not exist, either initially or after a
//! delete.

use std::pin::Pin;

use engivia_core::{Broadcast, BroadcastId};
use futures_util::{Stream, StreamExt, stream};
use surrealdb::{Action, Notification};

use crate::repositories::{BroadcastRecord, BroadcastRepository};
use crate::{DbError, get_db};

/// Stream of broadcast states. Ends when the live query is killed.
pub type BroadcastUpdates = Pin<Box<dyn Stream<Item = Result<Option<Broadcast>, DbError>> + Send>>;

/// Start watching a broadcast.
pub async fn watch_broadcast(id: &BroadcastId) -> Result<BroadcastUpdates, DbError> {
    let db = get_db()?;

    // Register the live query before reading so no change falls in between.
    let live = db
        .select::<Option<BroadcastRecord>>(("broadcast", id.as_str()))
        .live()
        .await?;
    let current = BroadcastRepository::find(id).await?;

    tracing::debug!(broadcast_id = %id, exists = current.is_some(), "Live query registered");

    let changes = live.map(|notification| match notification {
        Ok(notification) => from_notification(notification),
        Err(e) => Err(DbError::from(e)),
    });

    Ok(stream::once(async move { Ok(current) })
        .chain(changes)
        .boxed())
}

fn from_notification(
    notification: Notification<BroadcastRecord>,
) -> Result<Option<Broadcast>, DbError> {
    match notification.action {
        Action::Delete => Ok(None),
        _ => notification.data.into_broadcast().map(Some),
    }
}
