//! Broadcast server functions.
//!
//! Reads are open; writes require an admin session.

use dioxus::prelude::*;
use engivia_core::{Broadcast, BroadcastFields, BroadcastId, BroadcastPatch, EmbedUrl};

#[cfg(feature = "server")]
use crate::auth::server::{db_error, require};

/// List all broadcasts, newest first.
#[get("/api/broadcasts")]
pub async fn list_broadcasts() -> Result<Vec<Broadcast>, ServerFnError> {
    #[cfg(feature = "server")]
    {
        crate::auth::server::state().await?;
        db::repositories::BroadcastRepository::list()
            .await
            .map_err(db_error)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Get one broadcast.
#[post("/api/broadcasts/get")]
pub async fn get_broadcast(id: BroadcastId) -> Result<Broadcast, ServerFnError> {
    #[cfg(feature = "server")]
    {
        crate::auth::server::state().await?;
        db::repositories::BroadcastRepository::get(&id)
            .await
            .map_err(db_error)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Create a broadcast.
#[post("/api/broadcasts/create")]
pub async fn create_broadcast(
    token: String,
    fields: BroadcastFields,
) -> Result<Broadcast, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use engivia_core::Capability;

        let session = require(&token, Capability::Admin).await?;
        check_title(&fields.title)?;

        let broadcast = db::repositories::BroadcastRepository::create(&fields)
            .await
            .map_err(db_error)?;
        tracing::info!(broadcast_id = %broadcast.id, user_id = %session.user.id, "Broadcast created");
        Ok(broadcast)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Update the fields present in `patch`. Fails with not-found when the
/// broadcast does not exist.
#[post("/api/broadcasts/update")]
pub async fn update_broadcast(
    token: String,
    id: BroadcastId,
    patch: BroadcastPatch,
) -> Result<Broadcast, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use engivia_core::Capability;

        require(&token, Capability::Admin).await?;
        if let Some(title) = &patch.title {
            check_title(title)?;
        }
        if patch.is_empty() {
            return db::repositories::BroadcastRepository::get(&id)
                .await
                .map_err(db_error);
        }

        db::repositories::BroadcastRepository::update(&id, &patch)
            .await
            .map_err(db_error)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Delete a broadcast and its engivias. Deleting an absent broadcast succeeds.
#[post("/api/broadcasts/delete")]
pub async fn delete_broadcast(token: String, id: BroadcastId) -> Result<(), ServerFnError> {
    #[cfg(feature = "server")]
    {
        use db::repositories::BroadcastRepository;
        use engivia_core::Capability;

        let session = require(&token, Capability::Admin).await?;
        BroadcastRepository::delete(&id).await.map_err(db_error)?;
        tracing::info!(broadcast_id = %id, user_id = %session.user.id, "Broadcast deleted");
        Ok(())
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Attach a recorded video to a broadcast.
///
/// `url` is an [`EmbedUrl`], which only deserializes from a recognized video
/// URL, so nothing else can be stored.
#[post("/api/broadcasts/youtube-url")]
pub async fn set_youtube_url(
    token: String,
    id: BroadcastId,
    url: EmbedUrl,
) -> Result<Broadcast, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use engivia_core::Capability;

        require(&token, Capability::Admin).await?;
        let broadcast = db::repositories::BroadcastRepository::set_youtube_url(&id, &url)
            .await
            .map_err(db_error)?;
        tracing::info!(broadcast_id = %id, "Broadcast video set");
        Ok(broadcast)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

#[cfg(feature = "server")]
fn check_title(title: &str) -> Result<(), ServerFnError> {
    use engivia_core::StoreError;
    use engivia_core::validation::{Field, Schema, SingleField};

    SingleField {
        field: Field::Title,
        value: title,
    }
    .validate(&Schema::new())
    .map_err(|errors| crate::error::to_server_error(StoreError::Invalid(errors.to_string())))
}
