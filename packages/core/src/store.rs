//! Data access traits used by the page controllers.
//!
//! The browser implements these over server functions; tests implement them
//! in memory.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::broadcast::{Broadcast, BroadcastFields, BroadcastId, BroadcastPatch};
use crate::embed::EmbedUrl;
use crate::engivia::{Engivia, NewEngivia};
use crate::user::{Session, User, UserId};

/// Errors surfaced by a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[allow(async_fn_in_trait)]
pub trait BroadcastStore {
    async fn create_broadcast(&self, fields: BroadcastFields) -> Result<Broadcast, StoreError>;

    /// Fails with [`StoreError::NotFound`] when `id` does not exist.
    async fn update_broadcast(
        &self,
        id: &BroadcastId,
        patch: BroadcastPatch,
    ) -> Result<Broadcast, StoreError>;

    /// Deleting an absent broadcast succeeds.
    async fn delete_broadcast(&self, id: &BroadcastId) -> Result<(), StoreError>;

    async fn set_youtube_url(&self, id: &BroadcastId, url: EmbedUrl)
    -> Result<Broadcast, StoreError>;

    async fn get_broadcast(&self, id: &BroadcastId) -> Result<Broadcast, StoreError>;

    async fn list_broadcasts(&self) -> Result<Vec<Broadcast>, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait EngiviaStore {
    async fn get_engivias(&self, broadcast_id: &BroadcastId) -> Result<Vec<Engivia>, StoreError>;

    async fn post_engivia(&self, engivia: NewEngivia) -> Result<Engivia, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait UserStore {
    /// Persist a new display name. Does not refresh any session.
    async fn update_username(&self, user_id: &UserId, name: &str) -> Result<User, StoreError>;

    /// Re-authenticate with the current credentials so the session reflects
    /// the latest profile.
    async fn refresh_session(&self) -> Result<Session, StoreError>;

    /// The session behind the current credentials; `None` when the server
    /// does not know them.
    async fn resume_session(&self) -> Result<Option<Session>, StoreError>;
}
