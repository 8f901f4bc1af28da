//! Broadcast registration page: create a broadcast, or edit and delete one.

use dioxus::prelude::*;
use engivia_core::controller::{RegistrationController, RegistrationState, execute};
use engivia_core::validation::{BroadcastForm, Field};
use engivia_core::{BroadcastEntry, BroadcastId, BroadcastStore, StoreError};

use crate::components::{AppHeader, ConfirmDialog, FieldError};
use crate::outcome::use_outcome;
use crate::session::use_session;
use crate::store::ApiStore;

/// `id` is absent when creating a new broadcast.
///
/// The broadcast is read while the page is rendered on the server, so the
/// form arrives filled in.
#[component]
pub fn RegistrationPage(id: Option<BroadcastId>) -> Element {
    let session = use_session();
    let initial = use_server_future(use_reactive!(|(id,)| async move { load_entry(id).await }))?;

    if session.is_resolved() && !session.is_admin() {
        return rsx! {
            AppHeader {}
            div { class: "page-container",
                div { class: "error-banner", "このページは管理者のみ利用できます" }
            }
        };
    }

    let loaded = (*initial.read()).clone();

    rsx! {
        AppHeader {}
        div { class: "page-container",
            match loaded {
                Some(Ok(entry)) => {
                    // keyed by what was loaded, so a new id remounts the form
                    let key = entry.id().map_or_else(|| "new".to_string(), ToString::to_string);
                    rsx! { RegistrationForm { key: "{key}", entry } }
                }
                Some(Err(error)) => rsx! { LoadFailed { error } },
                None => rsx! {},
            }
        }
    }
}

async fn load_entry(id: Option<BroadcastId>) -> Result<BroadcastEntry, StoreError> {
    match id {
        None => Ok(BroadcastEntry::Draft),
        Some(id) => ApiStore::default()
            .get_broadcast(&id)
            .await
            .map(BroadcastEntry::Persisted),
    }
}

/// Sends the user back to the list with a notice once mounted in the browser.
#[component]
fn LoadFailed(error: StoreError) -> Element {
    let apply = use_outcome();

    use_effect(move || {
        let outcome = RegistrationController::new().load_failed(&error);
        apply(outcome);
    });

    rsx! {
        div { class: "error-banner", "放送を読み込めませんでした" }
    }
}

#[component]
fn RegistrationForm(entry: BroadcastEntry) -> Element {
    let session = use_session();
    let apply = use_outcome();
    let mut controller = use_signal(move || {
        let mut controller = RegistrationController::new();
        controller.loaded(entry);
        controller
    });
    let initial_form = controller.peek().initial_form();
    let mut title = use_signal(|| initial_form.title.clone());
    let mut date = use_signal(|| initial_form.broad_casting_date.clone());

    let submit = move |_| {
        let form = BroadcastForm {
            title: title(),
            broad_casting_date: date(),
        };
        let Some(command) = controller.write().submit(&form) else {
            return;
        };
        let store = ApiStore::new(session.token());
        spawn(async move {
            let result = execute(&store, &command).await;
            let outcome = controller.write().complete(result);
            apply(outcome);
        });
    };

    let confirm_delete = move |_| {
        let Some(command) = controller.write().confirm_delete() else {
            return;
        };
        let store = ApiStore::new(session.token());
        spawn(async move {
            let result = execute(&store, &command).await;
            let outcome = controller.write().complete(result);
            apply(outcome);
        });
    };

    let current = controller.read();
    let state = current.state().clone();
    let errors = current.errors().clone();
    let heading = current.heading();
    let can_delete = current.can_delete();
    let busy = current.is_busy();
    drop(current);

    rsx! {
        h1 { class: "page-title", "{heading}" }

        div { class: "form-card",
            div { class: "form-group",
                label { r#for: "title", "タイトル" }
                input {
                    id: "title",
                    r#type: "text",
                    value: "{title}",
                    disabled: busy,
                    oninput: move |e| title.set(e.value()),
                }
                FieldError { errors: errors.clone(), field: Field::Title }
            }

            div { class: "form-group",
                label { r#for: "broad-casting-date", "放送日" }
                input {
                    id: "broad-casting-date",
                    r#type: "date",
                    value: "{date}",
                    disabled: busy,
                    oninput: move |e| date.set(e.value()),
                }
                FieldError { errors: errors.clone(), field: Field::BroadCastingDate }
            }

            div { class: "form-actions",
                button {
                    class: "btn btn-primary",
                    disabled: busy,
                    onclick: submit,
                    if state == RegistrationState::Submitting { "保存中..." } else { "保存" }
                }
                button {
                    class: "btn btn-secondary",
                    disabled: busy,
                    onclick: move |_| {
                        let outcome = controller.write().cancel();
                        apply(outcome);
                    },
                    "キャンセル"
                }
                if can_delete {
                    button {
                        class: "btn btn-danger",
                        disabled: busy,
                        onclick: move |_| {
                            controller.write().request_delete();
                        },
                        "削除"
                    }
                }
            }
        }

        if state == RegistrationState::ConfirmDelete {
            ConfirmDialog {
                title: "放送を削除しますか？",
                message: "この操作は取り消せません。",
                on_confirm: confirm_delete,
                on_cancel: move |_| controller.write().cancel_delete(),
            }
        }
    }
}
