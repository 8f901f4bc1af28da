//! User account page: edit the signed-in user's display name.

use crate::route::{AppRoute, Notice, NoticePosition};
use crate::store::StoreError;
use crate::user::{Capability, Session, authorize};
use crate::validation::{Field, FieldErrors, Schema, SingleField};

use super::{Command, Completed, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Editing,
    Saving,
    /// The image cropping dialog is open.
    Cropping,
}

/// Controller for `/users/user-account`.
#[derive(Debug, Clone)]
pub struct UserAccountController {
    schema: Schema,
    name: String,
    state: AccountState,
    errors: FieldErrors,
}

impl UserAccountController {
    /// Start editing with the name currently in the session.
    pub fn new(session: Option<&Session>) -> Self {
        Self {
            schema: Schema::new(),
            name: session.map(|s| s.user.name.clone()).unwrap_or_default(),
            state: AccountState::Editing,
            errors: FieldErrors::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn state(&self) -> AccountState {
        self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn save(&mut self, session: Option<&Session>) -> Result<Command, Outcome> {
        if self.state != AccountState::Editing {
            return Err(Outcome::none());
        }
        let user = authorize(session, Capability::Member)
            .map_err(|_| Outcome::notice(Notice::error("ログインしてください")))?;

        let input = SingleField {
            field: Field::Name,
            value: &self.name,
        };
        if let Err(errors) = input.validate(&self.schema) {
            self.errors = errors;
            return Err(Outcome::none());
        }

        self.errors = FieldErrors::default();
        self.state = AccountState::Saving;
        Ok(Command::UpdateUsername {
            user_id: user.id.clone(),
            name: self.name.trim().to_string(),
        })
    }

    /// Feed back the result of the save. On success the outcome carries the
    /// refreshed session.
    pub fn complete(&mut self, result: Result<Completed, StoreError>) -> Outcome {
        self.state = AccountState::Editing;
        match result {
            Ok(Completed::Session(session)) => {
                self.name = session.user.name.clone();
                Outcome {
                    navigate: None,
                    notice: Some(Notice::success("保存しました", "👏", NoticePosition::TopCenter)),
                    session: Some(session),
                }
            }
            Ok(_) => Outcome::none(),
            Err(e) => Outcome::notice(Notice::error(format!("保存に失敗しました: {e}"))),
        }
    }

    pub fn cancel(&self) -> Outcome {
        Outcome {
            navigate: Some(AppRoute::Broadcasts),
            ..Outcome::default()
        }
    }

    pub fn open_crop(&mut self) {
        if self.state == AccountState::Editing {
            self.state = AccountState::Cropping;
        }
    }

    /// Confirming the crop dialog only closes it; no image is stored.
    pub fn confirm_crop(&mut self) {
        self.close_crop();
    }

    pub fn close_crop(&mut self) {
        if self.state == AccountState::Cropping {
            self.state = AccountState::Editing;
        }
    }
}
