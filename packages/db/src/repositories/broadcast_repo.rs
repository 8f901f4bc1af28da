//! Broadcast repository for CRUD operations.

use chrono::NaiveDate;
use engivia_core::{
    Broadcast, BroadcastFields, BroadcastId, BroadcastPatch, EmbedUrl, format_date,
};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::{DbError, get_db};

/// Repository for broadcast persistence operations.
pub struct BroadcastRepository;

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BroadcastRecord {
    id: Thing,
    title: String,
    broad_casting_date: NaiveDate,
    #[serde(default)]
    broad_cast_url: Option<EmbedUrl>,
}

impl BroadcastRecord {
    pub(crate) fn into_broadcast(self) -> Result<Broadcast, DbError> {
        let raw = self.id.id.to_raw();
        let id = BroadcastId::parse(&raw)
            .ok_or_else(|| DbError::Serialization(format!("Invalid broadcast id: {raw:?}")))?;
        Ok(Broadcast {
            id,
            title: self.title,
            broad_casting_date: self.broad_casting_date,
            broad_cast_url: self.broad_cast_url,
        })
    }
}

/// Content written on insert; timestamps and the video URL use schema defaults.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastCreate {
    title: String,
    broad_casting_date: String,
}

fn first(records: Vec<BroadcastRecord>, id: &BroadcastId) -> Result<Broadcast, DbError> {
    records
        .into_iter()
        .next()
        .ok_or_else(|| DbError::NotFound(format!("Broadcast not found: {id}")))?
        .into_broadcast()
}

impl BroadcastRepository {
    /// Insert a broadcast under a freshly generated id.
    pub async fn create(fields: &BroadcastFields) -> Result<Broadcast, DbError> {
        let db = get_db()?;
        let id = BroadcastId::generate();

        let create_data = BroadcastCreate {
            title: fields.title.clone(),
            broad_casting_date: format_date(fields.broad_casting_date),
        };

        let record: Option<BroadcastRecord> = db
            .create(("broadcast", id.as_str()))
            .content(create_data)
            .await?;

        tracing::debug!(broadcast_id = %id, "Broadcast created");

        record
            .ok_or_else(|| DbError::Query("Failed to create broadcast".into()))?
            .into_broadcast()
    }

    /// Get a broadcast by ID.
    pub async fn get(id: &BroadcastId) -> Result<Broadcast, DbError> {
        Self::find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Broadcast not found: {id}")))
    }

    /// Get a broadcast by ID, `None` when absent.
    pub async fn find(id: &BroadcastId) -> Result<Option<Broadcast>, DbError> {
        let db = get_db()?;

        let record: Option<BroadcastRecord> = db.select(("broadcast", id.as_str())).await?;

        record.map(BroadcastRecord::into_broadcast).transpose()
    }

    /// List all broadcasts, newest broadcasting date first.
    pub async fn list() -> Result<Vec<Broadcast>, DbError> {
        let db = get_db()?;

        let mut result = db
            .query("SELECT * FROM broadcast ORDER BY broadCastingDate DESC, createdAt DESC")
            .await?;

        let records: Vec<BroadcastRecord> = result.take(0)?;

        records
            .into_iter()
            .map(BroadcastRecord::into_broadcast)
            .collect()
    }

    /// Write the fields present in `patch`. Fails with `NotFound` if the
    /// broadcast does not exist; nothing is created.
    pub async fn update(id: &BroadcastId, patch: &BroadcastPatch) -> Result<Broadcast, DbError> {
        let db = get_db()?;

        let mut assignments = vec!["updatedAt = time::now()"];
        if patch.title.is_some() {
            assignments.push("title = $title");
        }
        if patch.broad_casting_date.is_some() {
            assignments.push("broadCastingDate = $date");
        }

        let query = format!(
            "UPDATE type::thing('broadcast', $id) SET {} RETURN AFTER",
            assignments.join(", ")
        );

        let mut request = db.query(&query).bind(("id", id.to_string()));
        if let Some(title) = &patch.title {
            request = request.bind(("title", title.clone()));
        }
        if let Some(date) = patch.broad_casting_date {
            request = request.bind(("date", format_date(date)));
        }

        let mut result = request.await?;
        let records: Vec<BroadcastRecord> = result.take(0)?;

        first(records, id)
    }

    /// Attach a normalized video URL to an existing broadcast.
    pub async fn set_youtube_url(id: &BroadcastId, url: &EmbedUrl) -> Result<Broadcast, DbError> {
        let db = get_db()?;

        let mut result = db
            .query("UPDATE type::thing('broadcast', $id) SET broadCastUrl = $url, updatedAt = time::now() RETURN AFTER")
            .bind(("id", id.to_string()))
            .bind(("url", url.as_str().to_string()))
            .await?;

        let records: Vec<BroadcastRecord> = result.take(0)?;

        first(records, id)
    }

    /// Delete a broadcast together with its engivias in one transaction, so
    /// a failure leaves both in place. Deleting an absent broadcast succeeds.
    pub async fn delete(id: &BroadcastId) -> Result<(), DbError> {
        let db = get_db()?;

        db.query(
            "BEGIN TRANSACTION;
             DELETE engivia WHERE broadcastId = $id;
             DELETE type::thing('broadcast', $id);
             COMMIT TRANSACTION;",
        )
        .bind(("id", id.to_string()))
        .await?
        .check()?;

        tracing::debug!(broadcast_id = %id, "Broadcast deleted");
        Ok(())
    }

    /// Check if a broadcast exists.
    pub async fn exists(id: &BroadcastId) -> Result<bool, DbError> {
        Ok(Self::find(id).await?.is_some())
    }
}
