//! Server configuration read from the environment.

use std::collections::HashSet;

use chrono::Duration;
use db::DbConfig;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Slack OpenID Connect client credentials.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DbConfig,
    /// Absent when Slack sign-in is not configured; sign-in then fails with
    /// an explicit error.
    pub slack: Option<SlackConfig>,
    /// Origin the browser reaches the app at, used for the OAuth redirect.
    pub public_base_url: String,
    /// Slack user ids granted the admin capability.
    pub admin_ids: HashSet<String>,
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint = match var("DATABASE_URL") {
            Some(url) => url,
            // Railway deployment - use file-based storage
            None if lookup("RAILWAY_ENVIRONMENT").is_some() => "file://./data/surrealdb".into(),
            None => "mem://".into(),
        };
        let mut database = DbConfig::new(endpoint);
        if let Some(namespace) = var("DATABASE_NAMESPACE") {
            database = database.namespace(namespace);
        }
        if let Some(name) = var("DATABASE_NAME") {
            database = database.database(name);
        }
        match (var("DATABASE_USER"), var("DATABASE_PASSWORD")) {
            (Some(user), Some(password)) => database = database.credentials(user, password),
            (Some(_), None) => return Err(ConfigError::Missing("DATABASE_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("DATABASE_USER")),
            (None, None) => {}
        }

        let slack = match (var("SLACK_CLIENT_ID"), var("SLACK_CLIENT_SECRET")) {
            (Some(client_id), Some(secret)) => Some(SlackConfig {
                client_id,
                client_secret: SecretString::from(secret),
            }),
            (Some(_), None) => return Err(ConfigError::Missing("SLACK_CLIENT_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("SLACK_CLIENT_ID")),
            (None, None) => None,
        };

        let public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080".into())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&public_base_url).map_err(|e| ConfigError::Invalid {
            name: "PUBLIC_BASE_URL",
            reason: e.to_string(),
        })?;

        let admin_ids = var("ADMIN_SLACK_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let session_ttl_hours = match var("SESSION_TTL_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_TTL_HOURS",
                        reason: format!("expected a positive number of hours, got {raw:?}"),
                    });
                }
            },
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            database,
            slack,
            public_base_url,
            admin_ids,
            session_ttl: Duration::hours(session_ttl_hours),
        })
    }

    /// Where Slack sends the user back after authorizing.
    pub fn redirect_uri(&self) -> String {
        format!("{}/login", self.public_base_url)
    }

    pub fn is_admin(&self, slack_user_id: &str) -> bool {
        self.admin_ids.contains(slack_user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_in_memory_without_slack() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database.endpoint, "mem://");
        assert_eq!(config.database.namespace, "engivia");
        assert!(config.slack.is_none());
        assert_eq!(config.redirect_uri(), "http://localhost:8080/login");
        assert_eq!(config.session_ttl, Duration::hours(DEFAULT_SESSION_TTL_HOURS));
    }

    #[test]
    fn reads_every_setting() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "rocksdb://./data/db"),
            ("DATABASE_NAMESPACE", "izumi"),
            ("DATABASE_NAME", "prod"),
            ("DATABASE_USER", "root"),
            ("DATABASE_PASSWORD", "pw"),
            ("SLACK_CLIENT_ID", "123.456"),
            ("SLACK_CLIENT_SECRET", "shh"),
            ("PUBLIC_BASE_URL", "https://engivia.example.com/"),
            ("ADMIN_SLACK_IDS", "U1, U2,,"),
            ("SESSION_TTL_HOURS", "12"),
        ]))
        .unwrap();

        assert_eq!(config.database.endpoint, "rocksdb://./data/db");
        assert_eq!(config.database.namespace, "izumi");
        assert_eq!(config.database.database, "prod");
        let root = config.database.credentials.as_ref().unwrap();
        assert_eq!((root.username.as_str(), root.password.as_str()), ("root", "pw"));
        let slack = config.slack.as_ref().unwrap();
        assert_eq!(slack.client_id, "123.456");
        assert_eq!(slack.client_secret.expose_secret(), "shh");
        assert_eq!(config.redirect_uri(), "https://engivia.example.com/login");
        assert!(config.is_admin("U1") && config.is_admin("U2"));
        assert!(!config.is_admin(""));
        assert_eq!(config.session_ttl, Duration::hours(12));
    }

    #[test]
    fn railway_uses_file_storage() {
        let config = AppConfig::from_lookup(lookup(&[("RAILWAY_ENVIRONMENT", "production")])).unwrap();
        assert_eq!(config.database.endpoint, "file://./data/surrealdb");
    }

    #[test]
    fn rejects_half_configured_secrets_and_bad_numbers() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("SLACK_CLIENT_ID", "x")])),
            Err(ConfigError::Missing("SLACK_CLIENT_SECRET"))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("DATABASE_USER", "root")])),
            Err(ConfigError::Missing("DATABASE_PASSWORD"))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("SESSION_TTL_HOURS", "0")])),
            Err(ConfigError::Invalid { name: "SESSION_TTL_HOURS", .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PUBLIC_BASE_URL", "not a url")])),
            Err(ConfigError::Invalid { name: "PUBLIC_BASE_URL", .. })
        ));
    }
}
