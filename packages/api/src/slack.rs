//! Slack "Sign in with Slack" (OpenID Connect) client.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::SlackConfig;

const AUTHORIZE_URL: &str = "https://slack.com/openid/connect/authorize";
const TOKEN_URL: &str = "https://slack.com/api/openid.connect.token";
const USER_INFO_URL: &str = "https://slack.com/api/openid.connect.userInfo";
const SCOPES: &str = "openid profile";

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Slack request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Slack returned an error: {0}")]
    Api(String),
    #[error("invalid Slack URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Profile returned by `openid.connect.userInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackProfile {
    /// Slack user id.
    pub sub: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    ok: bool,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    profile: Option<SlackProfile>,
}

pub struct SlackClient {
    client: Client,
    config: SlackConfig,
    redirect_uri: String,
}

impl SlackClient {
    pub fn new(config: SlackConfig, redirect_uri: String) -> Self {
        Self {
            client: Client::new(),
            config,
            redirect_uri,
        }
    }

    /// URL of the Slack consent page for a sign-in attempt identified by `state`.
    pub fn authorize_url(&self, state: &str) -> Result<String, SlackError> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("response_type", "code"),
                ("scope", SCOPES),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
                ("nonce", state),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code and fetch the signed-in user's profile.
    pub async fn sign_in(&self, code: &str) -> Result<SlackProfile, SlackError> {
        let access_token = self.exchange_code(code).await?;
        self.user_info(&access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<String, SlackError> {
        let response: TokenResponse = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response {
            TokenResponse {
                ok: true,
                access_token: Some(token),
                ..
            } if !token.is_empty() => Ok(token),
            TokenResponse { error, .. } => Err(SlackError::Api(
                error.unwrap_or_else(|| "token endpoint returned no access token".into()),
            )),
        }
    }

    async fn user_info(&self, access_token: &str) -> Result<SlackProfile, SlackError> {
        let response: UserInfoResponse = self
            .client
            .get(USER_INFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response {
            UserInfoResponse {
                ok: true,
                profile: Some(profile),
                ..
            } => Ok(profile),
            UserInfoResponse { error, .. } => Err(SlackError::Api(
                error.unwrap_or_else(|| "userInfo returned no profile".into()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn authorize_url_carries_client_redirect_and_state() {
        let client = SlackClient::new(
            SlackConfig {
                client_id: "123.456".into(),
                client_secret: SecretString::from("secret"),
            },
            "https://engivia.example.com/login".into(),
        );
        let url = Url::parse(&client.authorize_url("st8").unwrap()).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("slack.com"));
        assert_eq!(params["client_id"], "123.456");
        assert_eq!(params["redirect_uri"], "https://engivia.example.com/login");
        assert_eq!(params["state"], "st8");
        assert_eq!(params["scope"], "openid profile");
        assert!(!url.as_str().contains("secret"));
    }

    #[test]
    fn user_info_parses_profile_fields() {
        let body = r#"{"ok":true,"sub":"U0123","name":"alice","picture":"https://a/p.png","email":"a@example.com"}"#;
        let parsed: UserInfoResponse = serde_json::from_str(body).unwrap();
        let profile = parsed.profile.unwrap();
        assert_eq!(profile.sub, "U0123");
        assert_eq!(profile.picture.as_deref(), Some("https://a/p.png"));

        let failed: UserInfoResponse =
            serde_json::from_str(r#"{"ok":false,"error":"invalid_auth"}"#).unwrap();
        assert!(!failed.ok);
        assert_eq!(failed.error.as_deref(), Some("invalid_auth"));
    }
}
