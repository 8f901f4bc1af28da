//! Slack sign-in and session server functions.

use dioxus::prelude::*;
use engivia_core::Session;

/// URL of the Slack consent page for a new sign-in attempt.
#[get("/api/auth/slack")]
pub async fn slack_authorize_url() -> Result<String, ServerFnError> {
    #[cfg(feature = "server")]
    {
        let server = server::state().await?;
        let slack = server
            .slack
            .as_ref()
            .ok_or_else(|| ServerFnError::new("Slack sign-in is not configured"))?;

        let state = server.issue_oauth_state();
        slack
            .authorize_url(&state)
            .map_err(|e| ServerFnError::new(e.to_string()))
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Finish a Slack sign-in: exchange the code, record the user, open a session.
#[post("/api/auth/complete")]
pub async fn complete_sign_in(code: String, state: String) -> Result<Session, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use db::repositories::{SessionRepository, UserRepository};
        use engivia_core::{StoreError, User, UserId};

        use crate::error::to_server_error;

        let server = server::state().await?;
        if !server.take_oauth_state(&state) {
            return Err(to_server_error(StoreError::Unauthorized(
                "sign-in attempt expired or was already used".into(),
            )));
        }
        let slack = server
            .slack
            .as_ref()
            .ok_or_else(|| ServerFnError::new("Slack sign-in is not configured"))?;

        let profile = slack.sign_in(&code).await.map_err(|e| {
            tracing::warn!("Slack sign-in failed: {}", e);
            to_server_error(StoreError::Unauthorized(e.to_string()))
        })?;

        let is_admin = server.config.is_admin(&profile.sub);
        let user = UserRepository::upsert_from_profile(&User {
            id: UserId::new(profile.sub),
            name: profile.name,
            image: profile.picture.unwrap_or_default(),
            is_admin,
        })
        .await
        .map_err(server::db_error)?;

        let session = SessionRepository::create(&user.id, server.config.session_ttl)
            .await
            .map_err(server::db_error)?;
        tracing::info!(user_id = %user.id, is_admin, "User signed in");
        Ok(session)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Re-read the session with its current credentials so it reflects the
/// latest stored profile.
#[post("/api/auth/refresh")]
pub async fn refresh_session(token: String) -> Result<Session, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use engivia_core::Capability;

        server::require(&token, Capability::Member).await
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// The session for `token`, or `None` if it is unknown or expired.
#[post("/api/auth/session")]
pub async fn current_session(token: String) -> Result<Option<Session>, ServerFnError> {
    #[cfg(feature = "server")]
    {
        server::state().await?;
        db::repositories::SessionRepository::resolve(&token)
            .await
            .map_err(server::db_error)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Revoke a session.
#[post("/api/auth/sign-out")]
pub async fn sign_out(token: String) -> Result<(), ServerFnError> {
    #[cfg(feature = "server")]
    {
        server::state().await?;
        db::repositories::SessionRepository::delete(&token)
            .await
            .map_err(server::db_error)
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Helpers shared by the server function bodies.
#[cfg(feature = "server")]
pub(crate) mod server {
    use dioxus::prelude::ServerFnError;
    use engivia_core::{Capability, Session, StoreError, authorize};

    use crate::error::to_server_error;
    use crate::init::{ServerState, ensure_initialized};

    pub(crate) async fn state() -> Result<&'static ServerState, ServerFnError> {
        ensure_initialized()
            .await
            .map_err(|e| ServerFnError::new(format!("Initialization failed: {}", e)))
    }

    pub(crate) fn db_error(error: db::DbError) -> ServerFnError {
        if !matches!(error, db::DbError::NotFound(_)) {
            tracing::warn!("Database error: {}", error);
        }
        to_server_error(StoreError::from(error))
    }

    /// Resolve `token` and check it grants `capability`.
    pub(crate) async fn require(
        token: &str,
        capability: Capability,
    ) -> Result<Session, ServerFnError> {
        state().await?;
        let session = db::repositories::SessionRepository::resolve(token)
            .await
            .map_err(db_error)?;
        authorize(session.as_ref(), capability)
            .map_err(|e| to_server_error(StoreError::Unauthorized(e.to_string())))?;
        session.ok_or_else(|| to_server_error(StoreError::Unauthorized("sign-in required".into())))
    }
}
