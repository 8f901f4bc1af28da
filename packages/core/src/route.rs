//! Application routes and user-facing notices.

use serde::{Deserialize, Serialize};

use crate::BroadcastId;

/// Pages the controllers can navigate to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppRoute {
    Landing,
    Broadcasts,
    Registration { id: Option<BroadcastId> },
    BroadcastDone { id: BroadcastId },
    UserAccount,
}

impl AppRoute {
    pub fn path(&self) -> String {
        match self {
            AppRoute::Landing => "/".to_string(),
            AppRoute::Broadcasts => "/broadcasts".to_string(),
            AppRoute::Registration { id: None } => "/admin/broadcast-registration".to_string(),
            AppRoute::Registration { id: Some(id) } => {
                format!("/admin/broadcast-registration?id={id}")
            }
            AppRoute::BroadcastDone { id } => format!("/broadcast-done?id={id}"),
            AppRoute::UserAccount => "/users/user-account".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticePosition {
    TopCenter,
    BottomCenter,
}

/// A transient, non-blocking notification (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub icon: Option<String>,
    pub position: NoticePosition,
    pub duration_ms: u64,
}

impl Notice {
    pub const DEFAULT_DURATION_MS: u64 = 4000;

    pub fn success(message: impl Into<String>, icon: &str, position: NoticePosition) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            icon: Some(icon.to_string()),
            position,
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            icon: Some("⚠️".to_string()),
            position: NoticePosition::TopCenter,
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_page_routes() {
        let id = BroadcastId::parse("b1").unwrap();
        assert_eq!(AppRoute::Broadcasts.path(), "/broadcasts");
        assert_eq!(
            AppRoute::Registration { id: Some(id.clone()) }.path(),
            "/admin/broadcast-registration?id=b1"
        );
        assert_eq!(AppRoute::BroadcastDone { id }.path(), "/broadcast-done?id=b1");
    }
}
