use dioxus::prelude::*;
use engivia_core::controller::landing_redirect;

use crate::session::use_session;

/// Landing page: signed-in users go straight to the broadcast list.
#[component]
pub fn LandingPage() -> Element {
    let session = use_session();
    let navigator = use_navigator();

    use_effect(move || {
        if let Some(route) = landing_redirect(session.current().as_ref()) {
            navigator.replace(route.path());
        }
    });

    let authorize_url = use_resource(|| async move { api::slack_authorize_url().await });

    rsx! {
        div { class: "landing",
            h1 { class: "landing-title", "エンジビアの泉" }
            p { class: "landing-lead", "明日使えるエンジニアのムダ知識を投稿しよう" }

            match &*authorize_url.read() {
                Some(Ok(url)) => rsx! {
                    a { class: "btn btn-slack", href: "{url}", "Slackでログイン" }
                },
                Some(Err(e)) => rsx! {
                    p { class: "error-message", "ログインを開始できません: {e}" }
                },
                None => rsx! {
                    div { class: "loading", "読み込み中..." }
                },
            }
        }
    }
}
