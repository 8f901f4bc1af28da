//! Engivia: short trivia items submitted for a broadcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::BroadcastId;
use crate::user::User;

/// Unique identifier for an engivia.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngiviaId(String);

impl EngiviaId {
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        (!s.is_empty()).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EngiviaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author reference embedded in each engivia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUser {
    pub name: String,
    pub image: String,
}

impl From<&User> for PostUser {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engivia {
    pub id: EngiviaId,
    pub broadcast_id: BroadcastId,
    /// Display index assigned when the item is featured on air.
    #[serde(default)]
    pub engivia_number: Option<u32>,
    pub body: String,
    pub post_user: PostUser,
    pub created_at: DateTime<Utc>,
}

impl Engivia {
    /// Heading shown above a featured item, e.g. `エンジビア3`.
    pub fn heading(&self) -> Option<String> {
        self.engivia_number.map(|n| format!("エンジビア{n}"))
    }
}

/// A new engivia as submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEngivia {
    pub broadcast_id: BroadcastId,
    pub body: String,
}
