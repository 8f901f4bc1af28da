//! Broadcast domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::embed::EmbedUrl;

/// Identifier of a stored broadcast.
///
/// Ids assigned by the server are ULIDs, but ids of documents migrated from
/// the previous store are arbitrary strings, so any non-empty string is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BroadcastId(String);

impl BroadcastId {
    /// Create a new unique broadcast ID.
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Parse a broadcast ID, rejecting blank input.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            Some(Self(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BroadcastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scheduled broadcast session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: BroadcastId,
    pub title: String,
    /// Serialized as `yyyy-MM-dd`.
    pub broad_casting_date: NaiveDate,
    #[serde(default)]
    pub broad_cast_url: Option<EmbedUrl>,
}

impl Broadcast {
    /// Whether the broadcast has a recorded video attached.
    pub fn has_recording(&self) -> bool {
        self.broad_cast_url.is_some()
    }

    /// The date in the `yyyy-MM-dd` form used on the wire and in date inputs.
    pub fn date_string(&self) -> String {
        format_date(self.broad_casting_date)
    }
}

/// Fields supplied when inserting a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastFields {
    pub title: String,
    pub broad_casting_date: NaiveDate,
}

/// Partial update for a broadcast; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broad_casting_date: Option<NaiveDate>,
}

impl BroadcastPatch {
    /// Build a patch containing only the fields of `fields` that differ from `current`.
    pub fn diff(current: &Broadcast, fields: &BroadcastFields) -> Self {
        Self {
            title: (current.title != fields.title).then(|| fields.title.clone()),
            broad_casting_date: (current.broad_casting_date != fields.broad_casting_date)
                .then_some(fields.broad_casting_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.broad_casting_date.is_none()
    }

    /// Apply the patch to a broadcast in place.
    pub fn apply(&self, broadcast: &mut Broadcast) {
        if let Some(title) = &self.title {
            broadcast.title = title.clone();
        }
        if let Some(date) = self.broad_casting_date {
            broadcast.broad_casting_date = date;
        }
    }
}

/// A broadcast as seen by the registration form: not yet stored, or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "broadcast", rename_all = "snake_case")]
pub enum BroadcastEntry {
    Draft,
    Persisted(Broadcast),
}

impl BroadcastEntry {
    pub fn id(&self) -> Option<&BroadcastId> {
        match self {
            BroadcastEntry::Draft => None,
            BroadcastEntry::Persisted(b) => Some(&b.id),
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, BroadcastEntry::Draft)
    }
}

/// Format a date as `yyyy-MM-dd`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Broadcast {
        Broadcast {
            id: BroadcastId::parse("42").unwrap(),
            title: "Before".into(),
            broad_casting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            broad_cast_url: None,
        }
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(BroadcastId::parse("").is_none());
        assert!(BroadcastId::parse("   ").is_none());
        assert_eq!(BroadcastId::parse(" abc123 ").unwrap().as_str(), "abc123");
    }

    #[test]
    fn diff_keeps_only_changed_fields() {
        let current = sample();
        let fields = BroadcastFields {
            title: "After".into(),
            broad_casting_date: current.broad_casting_date,
        };
        let patch = BroadcastPatch::diff(&current, &fields);
        assert_eq!(patch.title.as_deref(), Some("After"));
        assert!(patch.broad_casting_date.is_none());

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "After" }));
    }

    #[test]
    fn wire_format_uses_camel_case_and_plain_dates() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["broadCastingDate"], "2024-01-01");
        assert!(json["broadCastUrl"].is_null());
    }
}
