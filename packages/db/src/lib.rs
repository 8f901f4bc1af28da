//! SurrealDB persistence for broadcasts, engivias, users and sessions.
//!
//! Call [`init`] once at startup; repositories then share one global
//! connection. The `rocksdb` feature enables the on-disk engine.

mod connection;
pub mod live;
pub mod repositories;
mod schema;

pub use connection::{Database, DbConfig, DbError, RootCredentials, get_db, init_db};
pub use schema::init_schema;

/// Connect and define the schema.
pub async fn init(config: DbConfig) -> Result<(), DbError> {
    init_db(config).await?;
    init_schema().await
}
