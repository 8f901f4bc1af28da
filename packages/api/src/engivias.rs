//! Engivia server functions.

use dioxus::prelude::*;
use engivia_core::{BroadcastId, Engivia, NewEngivia};

/// Engivias submitted for a broadcast.
#[post("/api/engivias/list")]
pub async fn get_engivias(broadcast_id: BroadcastId) -> Result<Vec<Engivia>, ServerFnError> {
    #[cfg(feature = "server")]
    {
        crate::auth::server::state().await?;
        db::repositories::EngiviaRepository::list_for_broadcast(&broadcast_id)
            .await
            .map_err(crate::auth::server::db_error)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Submit an engivia as the signed-in user.
#[post("/api/engivias/post")]
pub async fn post_engivia(token: String, engivia: NewEngivia) -> Result<Engivia, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use db::repositories::{BroadcastRepository, EngiviaRepository};
        use engivia_core::validation::{Field, Schema, SingleField};
        use engivia_core::{Capability, PostUser, StoreError};

        use crate::auth::server::{db_error, require};
        use crate::error::to_server_error;

        let session = require(&token, Capability::Member).await?;
        SingleField {
            field: Field::Body,
            value: &engivia.body,
        }
        .validate(&Schema::new())
        .map_err(|errors| to_server_error(StoreError::Invalid(errors.to_string())))?;

        // Engivias can only be attached to an existing broadcast.
        BroadcastRepository::get(&engivia.broadcast_id)
            .await
            .map_err(db_error)?;

        let created = EngiviaRepository::create(
            &engivia.broadcast_id,
            engivia.body.trim(),
            &PostUser::from(&session.user),
        )
        .await
        .map_err(db_error)?;
        tracing::info!(
            engivia_id = %created.id,
            broadcast_id = %created.broadcast_id,
            "Engivia posted"
        );
        Ok(created)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}
