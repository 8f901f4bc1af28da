//! Store implementation backed by the server functions.

use engivia_core::{
    Broadcast, BroadcastFields, BroadcastId, BroadcastPatch, BroadcastStore, EmbedUrl, Engivia,
    EngiviaStore, NewEngivia, Session, StoreError, User, UserId, UserStore,
};

/// Calls the server on behalf of the session whose token it carries.
#[derive(Debug, Clone, Default)]
pub struct ApiStore {
    token: Option<String>,
}

impl ApiStore {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    fn token(&self) -> Result<String, StoreError> {
        self.token
            .clone()
            .ok_or_else(|| StoreError::Unauthorized("sign-in required".into()))
    }
}

fn failed(error: dioxus::prelude::ServerFnError) -> StoreError {
    let error = api::store_error(&error);
    if matches!(error, StoreError::Backend(_)) {
        tracing::warn!("Server call failed: {}", error);
    }
    error
}

impl BroadcastStore for ApiStore {
    async fn create_broadcast(&self, fields: BroadcastFields) -> Result<Broadcast, StoreError> {
        api::create_broadcast(self.token()?, fields)
            .await
            .map_err(failed)
    }

    async fn update_broadcast(
        &self,
        id: &BroadcastId,
        patch: BroadcastPatch,
    ) -> Result<Broadcast, StoreError> {
        api::update_broadcast(self.token()?, id.clone(), patch)
            .await
            .map_err(failed)
    }

    async fn delete_broadcast(&self, id: &BroadcastId) -> Result<(), StoreError> {
        api::delete_broadcast(self.token()?, id.clone())
            .await
            .map_err(failed)
    }

    async fn set_youtube_url(
        &self,
        id: &BroadcastId,
        url: EmbedUrl,
    ) -> Result<Broadcast, StoreError> {
        api::set_youtube_url(self.token()?, id.clone(), url)
            .await
            .map_err(failed)
    }

    async fn get_broadcast(&self, id: &BroadcastId) -> Result<Broadcast, StoreError> {
        api::get_broadcast(id.clone()).await.map_err(failed)
    }

    async fn list_broadcasts(&self) -> Result<Vec<Broadcast>, StoreError> {
        api::list_broadcasts().await.map_err(failed)
    }
}

impl EngiviaStore for ApiStore {
    async fn get_engivias(&self, broadcast_id: &BroadcastId) -> Result<Vec<Engivia>, StoreError> {
        api::get_engivias(broadcast_id.clone())
            .await
            .map_err(failed)
    }

    async fn post_engivia(&self, engivia: NewEngivia) -> Result<Engivia, StoreError> {
        api::post_engivia(self.token()?, engivia)
            .await
            .map_err(failed)
    }
}

impl UserStore for ApiStore {
    async fn update_username(&self, user_id: &UserId, name: &str) -> Result<User, StoreError> {
        api::update_username(self.token()?, user_id.clone(), name.to_string())
            .await
            .map_err(failed)
    }

    async fn refresh_session(&self) -> Result<Session, StoreError> {
        api::refresh_session(self.token()?).await.map_err(failed)
    }

    async fn resume_session(&self) -> Result<Option<Session>, StoreError> {
        let Some(token) = self.token.clone() else {
            return Ok(None);
        };
        api::current_session(token).await.map_err(failed)
    }
}
