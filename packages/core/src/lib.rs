//! Core domain types for the エンジビアの泉 application.
//!
//! This crate contains shared types used across all packages:
//! - Broadcast, Engivia and User records
//! - Form validation and video URL normalization
//! - Page controllers and the store traits they drive
//! - Snapshots for real-time updates

mod broadcast;
pub mod controller;
mod embed;
mod engivia;
mod events;
mod route;
mod store;
mod user;
pub mod validation;

pub use broadcast::{
    Broadcast, BroadcastEntry, BroadcastFields, BroadcastId, BroadcastPatch, format_date,
};
pub use embed::{EmbedUrl, Unrecognized, normalize as normalize_embed_url};
pub use engivia::{Engivia, EngiviaId, NewEngivia, PostUser};
pub use events::{BroadcastSnapshot, SnapshotBatch};
pub use route::{AppRoute, Notice, NoticeKind, NoticePosition};
pub use store::{BroadcastStore, EngiviaStore, StoreError, UserStore};
pub use user::{AuthError, Capability, Session, User, UserId, authorize, authorize_at};
