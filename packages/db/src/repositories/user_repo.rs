//! User profile repository.

use engivia_core::{User, UserId};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::{DbError, get_db};

pub struct UserRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: Thing,
    name: String,
    image: String,
    #[serde(default)]
    is_admin: bool,
}

impl UserRecord {
    fn into_user(self) -> User {
        User {
            id: UserId::new(self.id.id.to_raw()),
            name: self.name,
            image: self.image,
            is_admin: self.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserCreate {
    name: String,
    image: String,
    is_admin: bool,
}

impl UserRepository {
    /// Record a sign-in from the identity provider.
    ///
    /// A first sign-in stores the provider profile as is. Later sign-ins
    /// refresh the image and admin flag but keep the display name, which the
    /// user may have changed.
    pub async fn upsert_from_profile(profile: &User) -> Result<User, DbError> {
        let db = get_db()?;

        if Self::find(&profile.id).await?.is_none() {
            let record: Option<UserRecord> = db
                .create(("user", profile.id.as_str()))
                .content(UserCreate {
                    name: profile.name.clone(),
                    image: profile.image.clone(),
                    is_admin: profile.is_admin,
                })
                .await?;
            tracing::info!(user_id = %profile.id, "New user registered");
            return record
                .map(UserRecord::into_user)
                .ok_or_else(|| DbError::Query("Failed to create user".into()));
        }

        let mut result = db
            .query("UPDATE type::thing('user', $id) SET image = $image, isAdmin = $is_admin, updatedAt = time::now() RETURN AFTER")
            .bind(("id", profile.id.to_string()))
            .bind(("image", profile.image.clone()))
            .bind(("is_admin", profile.is_admin))
            .await?;

        let records: Vec<UserRecord> = result.take(0)?;

        records
            .into_iter()
            .next()
            .map(UserRecord::into_user)
            .ok_or_else(|| DbError::NotFound(format!("User not found: {}", profile.id)))
    }

    /// Get a user by ID.
    pub async fn get(id: &UserId) -> Result<User, DbError> {
        Self::find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User not found: {id}")))
    }

    pub async fn find(id: &UserId) -> Result<Option<User>, DbError> {
        let db = get_db()?;

        let record: Option<UserRecord> = db.select(("user", id.as_str())).await?;

        Ok(record.map(UserRecord::into_user))
    }

    /// Change the display name.
    pub async fn update_name(id: &UserId, name: &str) -> Result<User, DbError> {
        let db = get_db()?;

        let mut result = db
            .query("UPDATE type::thing('user', $id) SET name = $name, updatedAt = time::now() RETURN AFTER")
            .bind(("id", id.to_string()))
            .bind(("name", name.to_string()))
            .await?;

        let records: Vec<UserRecord> = result.take(0)?;

        records
            .into_iter()
            .next()
            .map(UserRecord::into_user)
            .ok_or_else(|| DbError::NotFound(format!("User not found: {id}")))
    }
}
