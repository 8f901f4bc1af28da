//! The signed-in session, remembered in browser storage across page loads.

use chrono::Utc;
use dioxus::prelude::*;
use engivia_core::controller::{Resumed, resume_session};
use engivia_core::{Capability, Session, User, authorize};

use crate::store::ApiStore;

const TOKEN_KEY: &str = "engivia.session";

/// Shared handle to the current session.
#[derive(Clone, Copy, PartialEq)]
pub struct SessionContext {
    session: Signal<Option<Session>>,
    resolved: Signal<bool>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            session: Signal::new(None),
            resolved: Signal::new(false),
        }
    }

    /// The current session. Reading it subscribes the calling component.
    pub fn current(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_admin(&self) -> bool {
        authorize(self.session.read().as_ref(), Capability::Admin).is_ok()
    }

    /// Whether the remembered sign-in has been checked. Before that, and
    /// during server rendering, a missing session means "not known yet".
    pub fn is_resolved(&self) -> bool {
        *self.resolved.read()
    }

    /// Replace the session, remembering its token for later page loads or
    /// forgetting it on `None`.
    pub fn set(&mut self, session: Option<Session>) {
        remember_token(session.as_ref().map(|s| s.token.clone()));
        self.session.set(session);
        self.resolved.set(true);
    }

    /// Restore the sign-in remembered by an earlier page load.
    ///
    /// A sign-in that completes while this runs takes precedence.
    pub async fn resume(mut self) {
        if let Some(token) = remembered_token().await {
            match resume_session(&ApiStore::new(Some(token)), Utc::now()).await {
                Resumed::Session(session) => {
                    if self.session.peek().is_none() {
                        tracing::debug!(user_id = %session.user.id, "Session resumed");
                        self.session.set(Some(session));
                    }
                }
                Resumed::Expired => {
                    if self.session.peek().is_none() {
                        remember_token(None);
                    }
                }
                Resumed::Unavailable(e) => {
                    tracing::warn!("Could not resume the session: {}", e);
                }
            }
        }
        self.resolved.set(true);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
}

async fn remembered_token() -> Option<String> {
    let script = format!("return localStorage.getItem({TOKEN_KEY:?});");
    match document::eval(&script).join::<Option<String>>().await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Could not read the remembered session: {:?}", e);
            None
        }
    }
}

fn remember_token(token: Option<String>) {
    let script = format!(
        r#"
        const token = await dioxus.recv();
        if (token === null) {{
            localStorage.removeItem({TOKEN_KEY:?});
        }} else {{
            localStorage.setItem({TOKEN_KEY:?}, token);
        }}
        "#
    );
    if let Err(e) = document::eval(&script).send(token) {
        tracing::warn!("Could not remember the session: {:?}", e);
    }
}
