//! Broadcast registration page: create, edit and delete one broadcast.

use crate::broadcast::{BroadcastEntry, BroadcastPatch};
use crate::route::{AppRoute, Notice, NoticePosition};
use crate::store::StoreError;
use crate::validation::{BroadcastForm, FieldErrors, Schema};

use super::{Command, Completed, Outcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    LoadingInitial,
    Editing,
    Submitting,
    ConfirmDelete,
    NavigatingAway(AppRoute),
}

/// Controller for `/admin/broadcast-registration`.
#[derive(Debug, Clone)]
pub struct RegistrationController {
    schema: Schema,
    entry: BroadcastEntry,
    state: RegistrationState,
    errors: FieldErrors,
    pending: Option<Command>,
}

impl Default for RegistrationController {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationController {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(),
            entry: BroadcastEntry::Draft,
            state: RegistrationState::LoadingInitial,
            errors: FieldErrors::default(),
            pending: None,
        }
    }

    /// Initial data arrived: a draft when no id was given, otherwise the stored broadcast.
    pub fn loaded(&mut self, entry: BroadcastEntry) {
        self.entry = entry;
        self.errors = FieldErrors::default();
        self.state = RegistrationState::Editing;
    }

    /// The broadcast named by the query parameter could not be loaded.
    pub fn load_failed(&mut self, error: &StoreError) -> Outcome {
        let message = if error.is_not_found() {
            "放送が見つかりませんでした".to_string()
        } else {
            format!("放送の読み込みに失敗しました: {error}")
        };
        self.navigate_away(AppRoute::Broadcasts, Some(Notice::error(message)))
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn entry(&self) -> &BroadcastEntry {
        &self.entry
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            RegistrationState::LoadingInitial | RegistrationState::Submitting
        )
    }

    pub fn heading(&self) -> &'static str {
        if self.entry.is_draft() {
            "放送を作成"
        } else {
            "放送を編集"
        }
    }

    /// Whether the delete button is offered (stored broadcasts only).
    pub fn can_delete(&self) -> bool {
        !self.entry.is_draft()
    }

    /// Form values to show when editing starts.
    pub fn initial_form(&self) -> BroadcastForm {
        match &self.entry {
            BroadcastEntry::Draft => BroadcastForm::default(),
            BroadcastEntry::Persisted(b) => BroadcastForm {
                title: b.title.clone(),
                broad_casting_date: b.date_string(),
            },
        }
    }

    /// Validate and turn the form into a create or update command.
    ///
    /// Returns `None` when validation fails (errors are kept for inline
    /// display) or when the controller is not editing.
    pub fn submit(&mut self, form: &BroadcastForm) -> Option<Command> {
        if self.state != RegistrationState::Editing {
            return None;
        }
        let fields = match form.validate(&self.schema) {
            Ok(fields) => fields,
            Err(errors) => {
                self.errors = errors;
                return None;
            }
        };
        self.errors = FieldErrors::default();

        let command = match &self.entry {
            BroadcastEntry::Draft => Command::CreateBroadcast(fields),
            BroadcastEntry::Persisted(current) => Command::UpdateBroadcast {
                id: current.id.clone(),
                patch: BroadcastPatch::diff(current, &fields),
            },
        };
        self.begin(command)
    }

    /// Open the delete confirmation dialog.
    pub fn request_delete(&mut self) -> bool {
        if self.state == RegistrationState::Editing && self.can_delete() {
            self.state = RegistrationState::ConfirmDelete;
            true
        } else {
            false
        }
    }

    pub fn cancel_delete(&mut self) {
        if self.state == RegistrationState::ConfirmDelete {
            self.state = RegistrationState::Editing;
        }
    }

    pub fn confirm_delete(&mut self) -> Option<Command> {
        if self.state != RegistrationState::ConfirmDelete {
            return None;
        }
        let id = self.entry.id()?.clone();
        self.state = RegistrationState::Editing;
        self.begin(Command::DeleteBroadcast(id))
    }

    /// Leave without saving.
    pub fn cancel(&mut self) -> Outcome {
        if self.state == RegistrationState::Submitting {
            return Outcome::none();
        }
        self.navigate_away(AppRoute::Broadcasts, None)
    }

    /// Feed back the result of the pending command.
    pub fn complete(&mut self, result: Result<Completed, StoreError>) -> Outcome {
        let Some(command) = self.pending.take() else {
            return Outcome::none();
        };

        match (command, result) {
            (Command::DeleteBroadcast(_), Ok(_)) => self.navigate_away(
                AppRoute::Broadcasts,
                Some(Notice::success(
                    "放送を削除しました",
                    "🗑️",
                    NoticePosition::BottomCenter,
                )),
            ),
            (_, Ok(_)) => self.navigate_away(AppRoute::Broadcasts, None),
            (Command::UpdateBroadcast { .. }, Err(e)) if e.is_not_found() => {
                self.state = RegistrationState::Editing;
                Outcome::notice(Notice::error(
                    "この放送は既に削除されています。一覧から選び直してください",
                ))
            }
            (Command::DeleteBroadcast(_), Err(e)) => {
                self.state = RegistrationState::Editing;
                Outcome::notice(Notice::error(format!("削除に失敗しました: {e}")))
            }
            (_, Err(e)) => {
                self.state = RegistrationState::Editing;
                Outcome::notice(Notice::error(format!("保存に失敗しました: {e}")))
            }
        }
    }

    fn begin(&mut self, command: Command) -> Option<Command> {
        self.state = RegistrationState::Submitting;
        self.pending = Some(command.clone());
        Some(command)
    }

    fn navigate_away(&mut self, route: AppRoute, notice: Option<Notice>) -> Outcome {
        self.state = RegistrationState::NavigatingAway(route.clone());
        Outcome {
            navigate: Some(route),
            notice,
            session: None,
        }
    }
}
