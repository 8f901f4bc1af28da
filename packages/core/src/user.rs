//! Users, sessions and capability checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier issued by the identity provider (Slack `sub`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// An authenticated session as handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Something a session may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any signed-in user.
    Member,
    /// Broadcast curation: registration, deletion, video URLs.
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("sign-in required")]
    SignedOut,
    #[error("session expired")]
    Expired,
    #[error("{0:?} capability required")]
    Forbidden(Capability),
}

/// Check that `session` grants `capability`, returning the acting user.
pub fn authorize(session: Option<&Session>, capability: Capability) -> Result<&User, AuthError> {
    authorize_at(session, capability, Utc::now())
}

/// [`authorize`] against an explicit clock.
pub fn authorize_at(
    session: Option<&Session>,
    capability: Capability,
    now: DateTime<Utc>,
) -> Result<&User, AuthError> {
    let session = session.ok_or(AuthError::SignedOut)?;
    if session.is_expired(now) {
        return Err(AuthError::Expired);
    }
    match capability {
        Capability::Member => Ok(&session.user),
        Capability::Admin if session.user.is_admin => Ok(&session.user),
        Capability::Admin => Err(AuthError::Forbidden(Capability::Admin)),
    }
}
