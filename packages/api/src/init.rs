//! Server initialization.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::{Duration, Instant};

use actors::{ActorRef, HubConfig, HubMessage, LiveBroadcastSource, start_hub};
use db::DbError;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::{AppConfig, ConfigError};
use crate::slack::SlackClient;

/// How long a sign-in attempt may take between authorize and callback.
const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

static SERVER: LazyLock<OnceCell<ServerState>> = LazyLock::new(OnceCell::new);

#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Db(#[from] DbError),
    #[error("failed to start subscription hub: {0}")]
    Hub(String),
}

/// Process-wide server state, created once.
pub struct ServerState {
    pub config: AppConfig,
    pub slack: Option<SlackClient>,
    pub hub: ActorRef<HubMessage>,
    pub hub_config: HubConfig,
    oauth_states: Mutex<HashMap<String, Instant>>,
}

impl ServerState {
    /// Remember a freshly issued OAuth `state` value.
    pub fn issue_oauth_state(&self) -> String {
        let state = ulid::Ulid::new().to_string();
        let mut states = self
            .oauth_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        states.retain(|_, issued| issued.elapsed() < OAUTH_STATE_TTL);
        states.insert(state.clone(), Instant::now());
        state
    }

    /// Consume an OAuth `state` value. Each value is accepted at most once.
    pub fn take_oauth_state(&self, state: &str) -> bool {
        self.oauth_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(state)
            .is_some_and(|issued| issued.elapsed() < OAUTH_STATE_TTL)
    }
}

/// Initialize the server from environment configuration, once.
///
/// Every server function calls this first; only the first call does work.
pub async fn ensure_initialized() -> Result<&'static ServerState, InitError> {
    SERVER
        .get_or_try_init(|| async { init_server(AppConfig::from_env()?).await })
        .await
}

/// Initialize the server with an explicit configuration.
///
/// Has no effect if the server is already initialized.
pub async fn init_with(config: AppConfig) -> Result<&'static ServerState, InitError> {
    SERVER.get_or_try_init(|| init_server(config)).await
}

async fn init_server(config: AppConfig) -> Result<ServerState, InitError> {
    tracing::info!("Initializing server...");

    db::init(config.database.clone()).await?;

    let hub_config = HubConfig::default();
    let (hub, _handle) = start_hub(LiveBroadcastSource, hub_config.clone())
        .await
        .map_err(|e| InitError::Hub(e.to_string()))?;

    let slack = config
        .slack
        .clone()
        .map(|slack| SlackClient::new(slack, config.redirect_uri()));
    if slack.is_none() {
        tracing::warn!("SLACK_CLIENT_ID is not set; sign-in is disabled");
    }

    if let Err(e) = db::repositories::SessionRepository::purge_expired().await {
        tracing::warn!("Failed to purge expired sessions: {}", e);
    }

    tracing::info!("Server initialized");
    Ok(ServerState {
        config,
        slack,
        hub,
        hub_config,
        oauth_states: Mutex::new(HashMap::new()),
    })
}
