//! Database schema definitions using SurrealQL.

use crate::{DbError, get_db};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes.
pub async fn init_schema() -> Result<(), DbError> {
    let db = get_db()?;

    tracing::info!("Initializing database schema...");

    db.query(BROADCAST_SCHEMA).await?.check()?;
    db.query(ENGIVIA_SCHEMA).await?.check()?;
    db.query(USER_SCHEMA).await?.check()?;
    db.query(SESSION_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Broadcast table schema.
const BROADCAST_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS broadcast SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS title ON broadcast TYPE string ASSERT string::len($value) > 0;
-- yyyy-MM-dd
DEFINE FIELD IF NOT EXISTS broadCastingDate ON broadcast TYPE string;
DEFINE FIELD IF NOT EXISTS broadCastUrl ON broadcast TYPE option<string>;
DEFINE FIELD IF NOT EXISTS createdAt ON broadcast TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updatedAt ON broadcast TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS broadcast_date ON broadcast FIELDS broadCastingDate;
"#;

/// Engivia table schema.
const ENGIVIA_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS engivia SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS broadcastId ON engivia TYPE string;
DEFINE FIELD IF NOT EXISTS engiviaNumber ON engivia TYPE option<int>;
DEFINE FIELD IF NOT EXISTS body ON engivia TYPE string;
DEFINE FIELD IF NOT EXISTS postUser ON engivia TYPE object;
DEFINE FIELD IF NOT EXISTS postUser.name ON engivia TYPE string;
DEFINE FIELD IF NOT EXISTS postUser.image ON engivia TYPE string;
DEFINE FIELD IF NOT EXISTS createdAt ON engivia TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS engivia_broadcast ON engivia FIELDS broadcastId;
"#;

/// User profile table schema. Record ids are the identity provider's user ids.
const USER_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS name ON user TYPE string;
DEFINE FIELD IF NOT EXISTS image ON user TYPE string;
DEFINE FIELD IF NOT EXISTS isAdmin ON user TYPE bool DEFAULT false;
DEFINE FIELD IF NOT EXISTS createdAt ON user TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updatedAt ON user TYPE datetime DEFAULT time::now();
"#;

/// Session table schema. Record ids are the session tokens.
const SESSION_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS session SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS userId ON session TYPE string;
DEFINE FIELD IF NOT EXISTS expiresAt ON session TYPE datetime;
DEFINE FIELD IF NOT EXISTS createdAt ON session TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS session_user ON session FIELDS userId;
"#;
