//! Small components shared by the pages.

use dioxus::prelude::*;
use engivia_core::AppRoute;
use engivia_core::validation::{Field, FieldErrors};

use crate::session::use_session;
use crate::toast::use_toasts;

/// Modal asking the user to confirm a destructive action.
#[component]
pub fn ConfirmDialog(
    title: String,
    message: String,
    #[props(default = "削除する".to_string())] confirm_label: String,
    #[props(default = false)] busy: bool,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog",
                h3 { class: "modal-title", "{title}" }
                p { class: "modal-message", "{message}" }
                div { class: "modal-actions",
                    button {
                        class: "btn btn-secondary",
                        disabled: busy,
                        onclick: move |_| on_cancel.call(()),
                        "キャンセル"
                    }
                    button {
                        class: "btn btn-danger",
                        disabled: busy,
                        onclick: move |_| on_confirm.call(()),
                        "{confirm_label}"
                    }
                }
            }
        }
    }
}

/// Inline message for one form field, rendered only when it has an error.
#[component]
pub fn FieldError(errors: FieldErrors, field: Field) -> Element {
    match errors.get(field) {
        Some(message) => rsx! {
            p { class: "field-error", "{message}" }
        },
        None => rsx! {},
    }
}

/// Top bar with navigation and the signed-in user.
#[component]
pub fn AppHeader() -> Element {
    let mut session = use_session();
    let mut toasts = use_toasts();
    let navigator = use_navigator();
    let user = session.user();

    let sign_out = move |_| {
        let Some(token) = session.token() else {
            return;
        };
        spawn(async move {
            if let Err(e) = api::sign_out(token).await {
                tracing::warn!("Sign-out failed: {}", e);
            }
            session.set(None);
            toasts.push(engivia_core::Notice::success(
                "ログアウトしました",
                "👋",
                engivia_core::NoticePosition::TopCenter,
            ));
            navigator.push(AppRoute::Landing.path());
        });
    };

    rsx! {
        header { class: "app-header",
            Link { to: AppRoute::Broadcasts.path(), class: "app-logo", "エンジビアの泉" }
            nav { class: "app-nav",
                Link { to: AppRoute::Broadcasts.path(), class: "nav-link", active_class: "active", "放送一覧" }
                if session.is_admin() {
                    Link {
                        to: AppRoute::Registration { id: None }.path(),
                        class: "nav-link",
                        "放送を作成"
                    }
                }
            }
            if let Some(user) = user {
                div { class: "app-user",
                    Link { to: AppRoute::UserAccount.path(), class: "app-user-link",
                        img { class: "avatar avatar-sm", src: "{user.image}", alt: "{user.name}" }
                        span { "{user.name}" }
                    }
                    button { class: "btn btn-link", onclick: sign_out, "ログアウト" }
                }
            }
        }
    }
}
