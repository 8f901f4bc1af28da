//! Session repository. Sessions are opaque tokens bound to a user.

use chrono::{DateTime, Duration, Utc};
use engivia_core::{Session, UserId};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::repositories::UserRepository;
use crate::{DbError, get_db};

pub struct SessionRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCreate {
    user_id: String,
    expires_at: surrealdb::sql::Datetime,
}

impl SessionRepository {
    /// Issue a new session for `user_id` valid for `ttl`.
    pub async fn create(user_id: &UserId, ttl: Duration) -> Result<Session, DbError> {
        let db = get_db()?;
        let user = UserRepository::get(user_id).await?;
        let token = Ulid::new().to_string();
        let expires_at = Utc::now() + ttl;

        let _: Option<SessionRecord> = db
            .create(("session", token.as_str()))
            .content(SessionCreate {
                user_id: user_id.to_string(),
                expires_at: expires_at.into(),
            })
            .await?;

        tracing::debug!(user_id = %user_id, "Session issued");

        Ok(Session {
            token,
            user,
            expires_at,
        })
    }

    /// Resolve a token to a live session carrying the user's current profile.
    ///
    /// Unknown and expired tokens resolve to `None`; expired ones are removed.
    pub async fn resolve(token: &str) -> Result<Option<Session>, DbError> {
        let db = get_db()?;

        let record: Option<SessionRecord> = db.select(("session", token)).await?;
        let Some(record) = record else {
            return Ok(None);
        };

        if record.expires_at <= Utc::now() {
            Self::delete(token).await?;
            return Ok(None);
        }

        let Some(user) = UserRepository::find(&UserId::new(record.user_id)).await? else {
            Self::delete(token).await?;
            return Ok(None);
        };

        Ok(Some(Session {
            token: token.to_string(),
            user,
            expires_at: record.expires_at,
        }))
    }

    /// Revoke a session. Revoking an unknown token succeeds.
    pub async fn delete(token: &str) -> Result<(), DbError> {
        let db = get_db()?;

        let _: Option<SessionRecord> = db.delete(("session", token)).await?;

        Ok(())
    }

    /// Remove every expired session.
    pub async fn purge_expired() -> Result<(), DbError> {
        let db = get_db()?;

        db.query("DELETE session WHERE expiresAt <= time::now()")
            .await?
            .check()?;

        Ok(())
    }
}
