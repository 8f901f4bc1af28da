//! Server API functions for the engivia application.
//!
//! This crate contains all shared fullstack server functions for:
//! - Broadcast management (list, get, create, update, delete, video URL)
//! - Engivia listing and posting
//! - Slack sign-in, sessions and profile updates
//! - Real-time broadcast snapshots (long polling)

mod auth;
mod broadcasts;
mod engivias;
mod error;
mod realtime;
mod users;

#[cfg(feature = "server")]
mod config;

#[cfg(feature = "server")]
mod init;

#[cfg(feature = "server")]
mod slack;

// Re-export all server functions
pub use auth::*;
pub use broadcasts::*;
pub use engivias::*;
pub use error::{store_error, to_server_error};
pub use realtime::*;
pub use users::*;

#[cfg(feature = "server")]
pub use config::{AppConfig, ConfigError, SlackConfig};

#[cfg(feature = "server")]
pub use init::*;

// Re-export core types for convenience
pub use engivia_core::{
    Broadcast, BroadcastFields, BroadcastId, BroadcastPatch, EmbedUrl, Engivia, NewEngivia,
    Session, SnapshotBatch, User, UserId,
};
