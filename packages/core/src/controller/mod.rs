//! Page controllers.
//!
//! Each controller is a state machine over one primary entity. Transitions
//! that need the store return a [`Command`]; the caller runs it with
//! [`execute`] and feeds the result back through the controller's
//! `complete` method. Every write is awaited and branched on.

mod broadcast_done;
mod registration;
mod user_account;

pub use broadcast_done::{BroadcastDoneController, DoneState};
pub use registration::{RegistrationController, RegistrationState};
pub use user_account::{AccountState, UserAccountController};

use chrono::{DateTime, Utc};

use crate::broadcast::{Broadcast, BroadcastFields, BroadcastId, BroadcastPatch};
use crate::embed::EmbedUrl;
use crate::engivia::{Engivia, NewEngivia};
use crate::route::{AppRoute, Notice};
use crate::store::{BroadcastStore, EngiviaStore, StoreError, UserStore};
use crate::user::{Session, UserId};

/// A store operation requested by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateBroadcast(BroadcastFields),
    UpdateBroadcast { id: BroadcastId, patch: BroadcastPatch },
    DeleteBroadcast(BroadcastId),
    SetYoutubeUrl { id: BroadcastId, url: EmbedUrl },
    PostEngivia(NewEngivia),
    /// Update the name, then refresh the session.
    UpdateUsername { user_id: UserId, name: String },
}

/// Successful result of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completed {
    Broadcast(Broadcast),
    Deleted,
    Engivia(Engivia),
    Session(Session),
}

/// Everything the controllers need from the data layer.
pub trait Store: BroadcastStore + EngiviaStore + UserStore {}

impl<T: BroadcastStore + EngiviaStore + UserStore> Store for T {}

/// Run a command against the store.
///
/// A delete that finds nothing to delete counts as success.
pub async fn execute<S: Store>(store: &S, command: &Command) -> Result<Completed, StoreError> {
    match command {
        Command::CreateBroadcast(fields) => store
            .create_broadcast(fields.clone())
            .await
            .map(Completed::Broadcast),
        Command::UpdateBroadcast { id, patch } => store
            .update_broadcast(id, patch.clone())
            .await
            .map(Completed::Broadcast),
        Command::DeleteBroadcast(id) => match store.delete_broadcast(id).await {
            Ok(()) => Ok(Completed::Deleted),
            Err(e) if e.is_not_found() => Ok(Completed::Deleted),
            Err(e) => Err(e),
        },
        Command::SetYoutubeUrl { id, url } => store
            .set_youtube_url(id, url.clone())
            .await
            .map(Completed::Broadcast),
        Command::PostEngivia(engivia) => store
            .post_engivia(engivia.clone())
            .await
            .map(Completed::Engivia),
        Command::UpdateUsername { user_id, name } => {
            store.update_username(user_id, name).await?;
            store.refresh_session().await.map(Completed::Session)
        }
    }
}

/// What the page should do after a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub navigate: Option<AppRoute>,
    pub notice: Option<Notice>,
    /// A refreshed session to install in the session context.
    pub session: Option<Session>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }
}

/// Where the landing page sends a visitor: signed-in users go to the list.
pub fn landing_redirect(session: Option<&Session>) -> Option<AppRoute> {
    crate::user::authorize(session, crate::user::Capability::Member)
        .ok()
        .map(|_| AppRoute::Broadcasts)
}

/// Result of resuming a sign-in remembered from an earlier page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resumed {
    Session(Session),
    /// The credentials are no longer valid and should be forgotten.
    Expired,
    /// The server could not answer; keep the credentials for the next load.
    Unavailable(StoreError),
}

/// Resume the sign-in carried by `store`'s credentials.
pub async fn resume_session<S: UserStore>(store: &S, now: DateTime<Utc>) -> Resumed {
    match store.resume_session().await {
        Ok(Some(session)) if !session.is_expired(now) => Resumed::Session(session),
        Ok(_) | Err(StoreError::Unauthorized(_)) => Resumed::Expired,
        Err(e) => Resumed::Unavailable(e),
    }
}
