use dioxus::prelude::*;
use engivia_core::controller::{AccountState, UserAccountController, execute};
use engivia_core::validation::Field;

use crate::components::{AppHeader, FieldError};
use crate::outcome::use_outcome;
use crate::session::use_session;
use crate::store::ApiStore;

/// Profile page for the signed-in user.
#[component]
pub fn UserAccountPage() -> Element {
    let session = use_session();

    let body = match session.user() {
        // the editor starts from the restored profile
        Some(user) => rsx! { AccountEditor { key: "{user.id}" } },
        None if session.is_resolved() => rsx! {
            div { class: "error-banner", "ログインしてください" }
        },
        None => rsx! {},
    };

    rsx! {
        AppHeader {}
        div { class: "page-container", {body} }
    }
}

#[component]
fn AccountEditor() -> Element {
    let session = use_session();
    let apply = use_outcome();
    let mut controller = use_signal(move || UserAccountController::new(session.current().as_ref()));

    let save = move |_| {
        let current = session.current();
        let command = match controller.write().save(current.as_ref()) {
            Ok(command) => command,
            Err(outcome) => {
                apply(outcome);
                return;
            }
        };
        let store = ApiStore::new(session.token());
        spawn(async move {
            let result = execute(&store, &command).await;
            let outcome = controller.write().complete(result);
            apply(outcome);
        });
    };

    let Some(user) = session.user() else {
        return rsx! {};
    };

    let current = controller.read();
    let name = current.name().to_string();
    let state = current.state();
    let errors = current.errors().clone();
    drop(current);

    rsx! {
        h1 { class: "page-title", "アカウント設定" }

        div { class: "form-card",
            button {
                class: "avatar-button",
                title: "画像を変更",
                disabled: state != AccountState::Editing,
                onclick: move |_| controller.write().open_crop(),
                img { class: "avatar avatar-lg", src: "{user.image}", alt: "{user.name}" }
            }

            div { class: "form-group",
                label { r#for: "name", "表示名" }
                input {
                    id: "name",
                    r#type: "text",
                    value: "{name}",
                    disabled: state == AccountState::Saving,
                    oninput: move |e| controller.write().set_name(e.value()),
                }
                FieldError { errors, field: Field::Name }
            }

            div { class: "form-actions",
                button {
                    class: "btn btn-primary",
                    disabled: state != AccountState::Editing,
                    onclick: save,
                    if state == AccountState::Saving { "保存中..." } else { "保存" }
                }
                button {
                    class: "btn btn-secondary",
                    disabled: state == AccountState::Saving,
                    onclick: move |_| {
                        let outcome = controller.read().cancel();
                        apply(outcome);
                    },
                    "キャンセル"
                }
            }
        }

        if state == AccountState::Cropping {
            div { class: "modal-backdrop",
                div { class: "modal", role: "dialog",
                    h3 { class: "modal-title", "画像を切り抜く" }
                    img { class: "crop-preview", src: "{user.image}", alt: "" }
                    div { class: "modal-actions",
                        button {
                            class: "btn btn-secondary",
                            onclick: move |_| controller.write().close_crop(),
                            "キャンセル"
                        }
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| controller.write().confirm_crop(),
                            "決定"
                        }
                    }
                }
            }
        }
    }
}
