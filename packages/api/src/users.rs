//! User profile server functions.

use dioxus::prelude::*;
use engivia_core::{User, UserId};

/// Change a user's display name. Users may only rename themselves.
///
/// The caller's session is not refreshed; call `refresh_session` afterwards.
#[post("/api/users/name")]
pub async fn update_username(
    token: String,
    user_id: UserId,
    name: String,
) -> Result<User, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use engivia_core::validation::{Field, Schema, SingleField};
        use engivia_core::{Capability, StoreError};

        use crate::auth::server::{db_error, require};
        use crate::error::to_server_error;

        let session = require(&token, Capability::Member).await?;
        if session.user.id != user_id {
            return Err(to_server_error(StoreError::Unauthorized(
                "cannot rename another user".into(),
            )));
        }
        SingleField {
            field: Field::Name,
            value: &name,
        }
        .validate(&Schema::new())
        .map_err(|errors| to_server_error(StoreError::Invalid(errors.to_string())))?;

        let user = db::repositories::UserRepository::update_name(&user_id, name.trim())
            .await
            .map_err(db_error)?;
        tracing::info!(user_id = %user.id, "User renamed");
        Ok(user)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}
