//! Engivia repository.

use chrono::{DateTime, Utc};
use engivia_core::{BroadcastId, Engivia, EngiviaId, PostUser};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::{DbError, get_db};

pub struct EngiviaRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngiviaRecord {
    id: Thing,
    broadcast_id: String,
    #[serde(default)]
    engivia_number: Option<u32>,
    body: String,
    post_user: PostUser,
    created_at: DateTime<Utc>,
}

impl EngiviaRecord {
    fn into_engivia(self) -> Result<Engivia, DbError> {
        let raw = self.id.id.to_raw();
        let id = EngiviaId::parse(&raw)
            .ok_or_else(|| DbError::Serialization(format!("Invalid engivia id: {raw:?}")))?;
        let broadcast_id = BroadcastId::parse(&self.broadcast_id).ok_or_else(|| {
            DbError::Serialization(format!("Engivia {raw} has no broadcast id"))
        })?;
        Ok(Engivia {
            id,
            broadcast_id,
            engivia_number: self.engivia_number,
            body: self.body,
            post_user: self.post_user,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EngiviaCreate {
    broadcast_id: String,
    body: String,
    post_user: PostUser,
}

impl EngiviaRepository {
    /// Store a new engivia for `broadcast_id`, authored by `post_user`.
    pub async fn create(
        broadcast_id: &BroadcastId,
        body: &str,
        post_user: &PostUser,
    ) -> Result<Engivia, DbError> {
        let db = get_db()?;
        let id = EngiviaId::generate();

        let record: Option<EngiviaRecord> = db
            .create(("engivia", id.as_str()))
            .content(EngiviaCreate {
                broadcast_id: broadcast_id.to_string(),
                body: body.to_string(),
                post_user: post_user.clone(),
            })
            .await?;

        record
            .ok_or_else(|| DbError::Query("Failed to create engivia".into()))?
            .into_engivia()
    }

    /// Engivias for a broadcast: numbered items by number, then the rest by
    /// submission time.
    pub async fn list_for_broadcast(broadcast_id: &BroadcastId) -> Result<Vec<Engivia>, DbError> {
        let db = get_db()?;

        let mut result = db
            .query(
                "SELECT * FROM engivia WHERE broadcastId = $broadcast_id ORDER BY engiviaNumber ASC, createdAt ASC",
            )
            .bind(("broadcast_id", broadcast_id.to_string()))
            .await?;

        let records: Vec<EngiviaRecord> = result.take(0)?;

        let mut engivias = records
            .into_iter()
            .map(EngiviaRecord::into_engivia)
            .collect::<Result<Vec<_>, _>>()?;
        // NONE sorts before numbers in SurrealQL; featured items go first.
        engivias.sort_by_key(|e| (e.engivia_number.is_none(), e.engivia_number));
        Ok(engivias)
    }

    /// Assign the on-air display number.
    pub async fn set_number(id: &EngiviaId, number: u32) -> Result<Engivia, DbError> {
        let db = get_db()?;

        let mut result = db
            .query("UPDATE type::thing('engivia', $id) SET engiviaNumber = $number RETURN AFTER")
            .bind(("id", id.to_string()))
            .bind(("number", number))
            .await?;

        let records: Vec<EngiviaRecord> = result.take(0)?;

        records
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound(format!("Engivia not found: {id}")))?
            .into_engivia()
    }
}
