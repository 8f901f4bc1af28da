//! The process-wide SurrealDB handle.

use std::sync::LazyLock;

use engivia_core::StoreError;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use thiserror::Error;
use tokio::sync::OnceCell;

pub type Database = Surreal<Any>;

static DB: LazyLock<OnceCell<Database>> = LazyLock::new(OnceCell::new);

/// Root user to sign in as after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCredentials {
    pub username: String,
    pub password: String,
}

/// Where and how to connect.
///
/// `endpoint` is any URL the SurrealDB `any` engine accepts: `mem://` for
/// tests, `file://` or `rocksdb://` for a local store, `ws://` for a server.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<RootCredentials>,
}

impl DbConfig {
    pub const DEFAULT_NAMESPACE: &'static str = "engivia";
    pub const DEFAULT_DATABASE: &'static str = "main";

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            database: Self::DEFAULT_DATABASE.to_string(),
            credentials: None,
        }
    }

    /// Throwaway in-memory store.
    pub fn memory() -> Self {
        Self::new("mem://")
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(RootCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Whether data outlives the process.
    pub fn is_persistent(&self) -> bool {
        !self.endpoint.starts_with("mem://")
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::memory()
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database used before init_db")]
    NotInitialized,
    #[error("database error: {0}")]
    Connection(#[from] surrealdb::Error),
    #[error("query failed: {0}")]
    Query(String),
    #[error("{0}")]
    NotFound(String),
    #[error("malformed record: {0}")]
    Serialization(String),
}

impl From<DbError> for StoreError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::NotFound(what) => StoreError::NotFound(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Connect once; later calls return the existing handle and ignore `config`.
pub async fn init_db(config: DbConfig) -> Result<&'static Database, DbError> {
    DB.get_or_try_init(|| async {
        tracing::info!(
            endpoint = %config.endpoint,
            persistent = config.is_persistent(),
            "Connecting to SurrealDB"
        );
        let db = connect(config.endpoint.as_str()).await?;

        if let Some(root) = &config.credentials {
            db.signin(Root {
                username: &root.username,
                password: &root.password,
            })
            .await?;
        }
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        tracing::info!(namespace = %config.namespace, database = %config.database, "SurrealDB ready");
        Ok(db)
    })
    .await
}

pub fn get_db() -> Result<&'static Database, DbError> {
    DB.get().ok_or(DbError::NotInitialized)
}
