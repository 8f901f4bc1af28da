use dioxus::prelude::*;
use engivia_core::{AppRoute, Notice, NoticePosition};

use crate::session::use_session;
use crate::toast::use_toasts;

/// Slack redirects back here with `code` and `state`; finish the sign-in.
#[component]
pub fn LoginPage(code: String, state: String) -> Element {
    let mut session = use_session();
    let mut toasts = use_toasts();
    let navigator = use_navigator();

    use_future(move || {
        let code = code.clone();
        let state = state.clone();
        async move {
            if code.is_empty() {
                toasts.push(Notice::error("ログインがキャンセルされました"));
                navigator.replace(AppRoute::Landing.path());
                return;
            }
            match api::complete_sign_in(code, state).await {
                Ok(signed_in) => {
                    let name = signed_in.user.name.clone();
                    session.set(Some(signed_in));
                    toasts.push(Notice::success(
                        format!("ようこそ、{name}さん"),
                        "🎉",
                        NoticePosition::TopCenter,
                    ));
                    navigator.replace(AppRoute::Broadcasts.path());
                }
                Err(e) => {
                    toasts.push(Notice::error(format!(
                        "ログインに失敗しました: {}",
                        api::store_error(&e)
                    )));
                    navigator.replace(AppRoute::Landing.path());
                }
            }
        }
    });

    rsx! {
        div { class: "loading", "ログインしています..." }
    }
}
