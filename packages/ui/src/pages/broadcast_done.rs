//! Live view of one broadcast with its engivias.

use dioxus::prelude::*;
use engivia_core::controller::{BroadcastDoneController, Command, DoneState, execute};
use engivia_core::validation::Field;
use engivia_core::{Broadcast, BroadcastId, Engivia, EngiviaStore, Notice, StoreError};

use crate::components::{AppHeader, ConfirmDialog, FieldError};
use crate::outcome::use_outcome;
use crate::realtime::use_broadcast_snapshots;
use crate::session::use_session;
use crate::store::ApiStore;
use crate::toast::use_toasts;

/// The engivia list is read while the page is rendered on the server; the
/// broadcast itself arrives through the live subscription.
#[component]
pub fn BroadcastDonePage(id: BroadcastId) -> Element {
    let initial = use_server_future(use_reactive!(|(id,)| async move {
        let engivias = ApiStore::default().get_engivias(&id).await;
        (id, engivias)
    }))?;

    let loaded = (*initial.read()).clone();
    match loaded {
        // keyed by what was loaded, so a new id starts over
        Some((id, engivias)) => rsx! {
            BroadcastDoneView { key: "{id}", id, engivias }
        },
        None => rsx! { AppHeader {} },
    }
}

#[component]
fn BroadcastDoneView(id: BroadcastId, engivias: Result<Vec<Engivia>, StoreError>) -> Element {
    let session = use_session();
    let apply = use_outcome();
    let mut toasts = use_toasts();
    let initial_id = id.clone();
    let load_error = engivias.as_ref().err().cloned();
    let mut controller = use_signal(move || {
        let mut controller = BroadcastDoneController::new(initial_id);
        if let Ok(engivias) = engivias {
            controller.set_engivias(engivias);
        }
        controller
    });
    let mut url_input = use_signal(String::new);
    let mut body_input = use_signal(String::new);

    use_effect(move || {
        if let Some(e) = &load_error {
            toasts.push(Notice::error(format!("エンジビアの読み込みに失敗しました: {e}")));
        }
    });

    use_broadcast_snapshots(id, controller);

    let run = move |command: Command| {
        let store = ApiStore::new(session.token());
        spawn(async move {
            let result = execute(&store, &command).await;
            let posted = matches!(command, Command::PostEngivia(_)) && result.is_ok();
            let outcome = controller.write().complete(result);
            if posted {
                body_input.set(String::new());
            }
            apply(outcome);
        });
    };

    let save_url = move |_| {
        let current = session.current();
        match controller.write().submit_url(current.as_ref(), &url_input()) {
            Ok(command) => run(command),
            Err(outcome) => apply(outcome),
        }
    };

    let post_engivia = move |_| {
        let current = session.current();
        match controller.write().submit_engivia(current.as_ref(), &body_input()) {
            Ok(command) => run(command),
            Err(outcome) => apply(outcome),
        }
    };

    let request_delete = move |_| {
        let current = session.current();
        if let Err(outcome) = controller.write().request_delete(current.as_ref()) {
            apply(outcome);
        }
    };

    let confirm_delete = move |_| {
        if let Some(command) = controller.write().confirm_delete() {
            run(command);
        }
    };

    let current = controller.read();
    let broadcast = current.broadcast().cloned();
    let engivias = current.engivias().to_vec();
    let state = current.state().clone();
    let errors = current.errors().clone();
    let received = current.cursor() > 0;
    drop(current);

    let session_now = session.current();
    let is_admin = BroadcastDoneController::shows_admin_panel(session_now.as_ref());
    let signed_in = session_now.is_some();
    let idle = state == DoneState::Viewing;

    rsx! {
        AppHeader {}
        div { class: "page-container",
            match broadcast {
                Some(broadcast) => rsx! { BroadcastView { broadcast } },
                None if received => rsx! {
                    div { class: "empty-state", "この放送は削除されました" }
                },
                None => rsx! {
                    div { class: "loading", "読み込み中..." }
                },
            }

            if is_admin {
                section { class: "admin-panel",
                    h2 { class: "section-title", "管理者メニュー" }
                    div { class: "form-group",
                        label { r#for: "broad-cast-url", "YouTube URL" }
                        input {
                            id: "broad-cast-url",
                            r#type: "url",
                            placeholder: "https://www.youtube.com/watch?v=...",
                            value: "{url_input}",
                            oninput: move |e| url_input.set(e.value()),
                        }
                        FieldError { errors: errors.clone(), field: Field::BroadCastUrl }
                    }
                    div { class: "form-actions",
                        button {
                            class: "btn btn-primary",
                            disabled: !idle,
                            onclick: save_url,
                            if state == DoneState::SavingUrl { "保存中..." } else { "URLを保存" }
                        }
                        button {
                            class: "btn btn-danger",
                            disabled: !idle,
                            onclick: request_delete,
                            "放送を削除"
                        }
                    }
                }
            }

            section { class: "engivia-section",
                h2 { class: "section-title", "エンジビア" }
                if engivias.is_empty() {
                    p { class: "empty-state", "まだエンジビアはありません" }
                }
                ul { class: "engivia-list",
                    for engivia in engivias {
                        EngiviaCard { key: "{engivia.id}", engivia }
                    }
                }

                if signed_in {
                    div { class: "form-card engivia-form",
                        div { class: "form-group",
                            label { r#for: "engivia-body", "エンジビアを投稿" }
                            textarea {
                                id: "engivia-body",
                                rows: 3,
                                value: "{body_input}",
                                oninput: move |e| body_input.set(e.value()),
                            }
                            FieldError { errors: errors.clone(), field: Field::Body }
                        }
                        button {
                            class: "btn btn-primary",
                            disabled: !idle,
                            onclick: post_engivia,
                            if state == DoneState::PostingEngivia { "投稿中..." } else { "投稿" }
                        }
                    }
                }
            }

            if matches!(state, DoneState::ConfirmDelete | DoneState::Deleting) {
                ConfirmDialog {
                    title: "放送を削除しますか？",
                    message: "この放送とエンジビアは元に戻せません。",
                    busy: state == DoneState::Deleting,
                    on_confirm: confirm_delete,
                    on_cancel: move |_| controller.write().cancel_delete(),
                }
            }
        }
    }
}

#[component]
fn BroadcastView(broadcast: Broadcast) -> Element {
    let date = broadcast.date_string();

    rsx! {
        div { class: "broadcast-view",
            h1 { class: "page-title", "{broadcast.title}" }
            p { class: "broadcast-date", "{date}" }
            match &broadcast.broad_cast_url {
                Some(url) => rsx! {
                    div { class: "video-frame",
                        iframe {
                            src: "{url}",
                            title: "{broadcast.title}",
                            allowfullscreen: true,
                        }
                    }
                },
                None => rsx! {
                    p { class: "video-missing", "録画はまだありません" }
                },
            }
        }
    }
}

#[component]
fn EngiviaCard(engivia: Engivia) -> Element {
    rsx! {
        li { class: "engivia-card",
            if let Some(heading) = engivia.heading() {
                span { class: "engivia-number", "{heading}" }
            }
            p { class: "engivia-body", "{engivia.body}" }
            div { class: "engivia-author",
                img { class: "avatar avatar-sm", src: "{engivia.post_user.image}", alt: "" }
                span { "{engivia.post_user.name}" }
            }
        }
    }
}
