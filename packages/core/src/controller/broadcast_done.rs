//! Broadcast-done page: live broadcast view, admin URL panel and engivia list.

use crate::broadcast::{Broadcast, BroadcastId};
use crate::embed;
use crate::engivia::{Engivia, NewEngivia};
use crate::events::{BroadcastSnapshot, SnapshotBatch};
use crate::route::{AppRoute, Notice, NoticePosition};
use crate::store::StoreError;
use crate::user::{AuthError, Capability, Session, authorize};
use crate::validation::{Field, FieldErrors, Schema, SingleField};

use super::{Command, Completed, Outcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoneState {
    Viewing,
    SavingUrl,
    ConfirmDelete,
    Deleting,
    PostingEngivia,
    NavigatingAway(AppRoute),
}

/// Controller for `/broadcast-done`.
#[derive(Debug, Clone)]
pub struct BroadcastDoneController {
    schema: Schema,
    broadcast_id: BroadcastId,
    latest: Option<Broadcast>,
    last_seq: u64,
    engivias: Vec<Engivia>,
    state: DoneState,
    errors: FieldErrors,
}

impl BroadcastDoneController {
    pub fn new(broadcast_id: BroadcastId) -> Self {
        Self {
            schema: Schema::new(),
            broadcast_id,
            latest: None,
            last_seq: 0,
            engivias: Vec::new(),
            state: DoneState::Viewing,
            errors: FieldErrors::default(),
        }
    }

    pub fn broadcast_id(&self) -> &BroadcastId {
        &self.broadcast_id
    }

    /// Latest known document; absent until the first snapshot.
    pub fn broadcast(&self) -> Option<&Broadcast> {
        self.latest.as_ref()
    }

    /// Sequence number of the last applied snapshot.
    pub fn cursor(&self) -> u64 {
        self.last_seq
    }

    pub fn engivias(&self) -> &[Engivia] {
        &self.engivias
    }

    pub fn state(&self) -> &DoneState {
        &self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Whether the admin panel is shown for this session.
    pub fn shows_admin_panel(session: Option<&Session>) -> bool {
        authorize(session, Capability::Admin).is_ok()
    }

    /// Apply a snapshot. Snapshots at or before the cursor are ignored so a
    /// consumer never moves backwards.
    pub fn apply_snapshot(&mut self, snapshot: BroadcastSnapshot) -> bool {
        if snapshot.seq <= self.last_seq {
            return false;
        }
        self.last_seq = snapshot.seq;
        self.latest = snapshot.broadcast;
        true
    }

    /// Apply every snapshot of a batch in order; returns how many were applied.
    ///
    /// A lagged batch resets the cursor first, since the server may have
    /// restarted its numbering.
    pub fn apply_batch(&mut self, batch: SnapshotBatch) -> usize {
        if batch.lagged {
            self.last_seq = 0;
        }
        batch
            .snapshots
            .into_iter()
            .map(|s| self.apply_snapshot(s))
            .filter(|applied| *applied)
            .count()
    }

    pub fn set_engivias(&mut self, engivias: Vec<Engivia>) {
        self.engivias = engivias;
    }

    /// Normalize a pasted URL and request it be stored on the broadcast.
    pub fn submit_url(&mut self, session: Option<&Session>, raw: &str) -> Result<Command, Outcome> {
        self.ensure_viewing()?;
        authorize(session, Capability::Admin).map_err(denied)?;

        let input = SingleField {
            field: Field::BroadCastUrl,
            value: raw,
        };
        if let Err(errors) = input.validate(&self.schema) {
            self.errors = errors;
            return Err(Outcome::none());
        }
        let url = match embed::normalize(raw) {
            Ok(url) => url,
            Err(_) => {
                self.errors =
                    FieldErrors::single(Field::BroadCastUrl, "YouTubeの動画URLを入力してください");
                return Err(Outcome::none());
            }
        };

        self.errors = FieldErrors::default();
        self.state = DoneState::SavingUrl;
        Ok(Command::SetYoutubeUrl {
            id: self.broadcast_id.clone(),
            url,
        })
    }

    pub fn request_delete(&mut self, session: Option<&Session>) -> Result<(), Outcome> {
        self.ensure_viewing()?;
        authorize(session, Capability::Admin).map_err(denied)?;
        self.state = DoneState::ConfirmDelete;
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        if self.state == DoneState::ConfirmDelete {
            self.state = DoneState::Viewing;
        }
    }

    pub fn confirm_delete(&mut self) -> Option<Command> {
        if self.state != DoneState::ConfirmDelete {
            return None;
        }
        self.state = DoneState::Deleting;
        Some(Command::DeleteBroadcast(self.broadcast_id.clone()))
    }

    /// Submit a new engivia for this broadcast.
    pub fn submit_engivia(&mut self, session: Option<&Session>, body: &str) -> Result<Command, Outcome> {
        self.ensure_viewing()?;
        authorize(session, Capability::Member).map_err(denied)?;

        let input = SingleField {
            field: Field::Body,
            value: body,
        };
        if let Err(errors) = input.validate(&self.schema) {
            self.errors = errors;
            return Err(Outcome::none());
        }

        self.errors = FieldErrors::default();
        self.state = DoneState::PostingEngivia;
        Ok(Command::PostEngivia(NewEngivia {
            broadcast_id: self.broadcast_id.clone(),
            body: body.trim().to_string(),
        }))
    }

    /// Feed back the result of the pending command.
    pub fn complete(&mut self, result: Result<Completed, StoreError>) -> Outcome {
        let previous = std::mem::replace(&mut self.state, DoneState::Viewing);
        match (previous, result) {
            (DoneState::Deleting, Ok(_)) => {
                let route = AppRoute::Broadcasts;
                self.state = DoneState::NavigatingAway(route.clone());
                Outcome {
                    navigate: Some(route),
                    notice: Some(Notice::success(
                        "放送を削除しました",
                        "🗑️",
                        NoticePosition::BottomCenter,
                    )),
                    session: None,
                }
            }
            (DoneState::SavingUrl, Ok(Completed::Broadcast(broadcast))) => {
                // Snapshots from the subscription stay authoritative; this only
                // fills the gap until the next one arrives.
                if self.latest.is_none() {
                    self.latest = Some(broadcast);
                }
                Outcome::notice(Notice::success("保存しました", "👏", NoticePosition::TopCenter))
            }
            (DoneState::PostingEngivia, Ok(Completed::Engivia(engivia))) => {
                self.engivias.push(engivia);
                Outcome::notice(Notice::success(
                    "エンジビアを投稿しました",
                    "💡",
                    NoticePosition::TopCenter,
                ))
            }
            (_, Ok(_)) => Outcome::none(),
            (DoneState::SavingUrl, Err(e)) if e.is_not_found() => {
                Outcome::notice(Notice::error("この放送は既に削除されています"))
            }
            (DoneState::Deleting, Err(e)) => {
                Outcome::notice(Notice::error(format!("削除に失敗しました: {e}")))
            }
            (_, Err(e)) => Outcome::notice(Notice::error(format!("保存に失敗しました: {e}"))),
        }
    }

    fn ensure_viewing(&self) -> Result<(), Outcome> {
        if self.state == DoneState::Viewing {
            Ok(())
        } else {
            Err(Outcome::none())
        }
    }
}

fn denied(error: AuthError) -> Outcome {
    let message = match error {
        AuthError::SignedOut | AuthError::Expired => "ログインしてください".to_string(),
        AuthError::Forbidden(_) => "この操作には管理者権限が必要です".to_string(),
    };
    Outcome::notice(Notice::error(message))
}
