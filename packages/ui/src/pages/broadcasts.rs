//! Broadcast list page.

use chrono::Utc;
use dioxus::prelude::*;
use engivia_core::{AppRoute, Broadcast};

use crate::components::AppHeader;
use crate::session::use_session;

#[component]
pub fn BroadcastsPage() -> Element {
    let session = use_session();
    let broadcasts = use_resource(|| async move { api::list_broadcasts().await });

    rsx! {
        AppHeader {}
        div { class: "page-container",
            div { class: "page-header",
                h1 { class: "page-title", "放送一覧" }
                if session.is_admin() {
                    Link {
                        to: AppRoute::Registration { id: None }.path(),
                        class: "btn btn-primary",
                        "+ 新しい放送"
                    }
                }
            }

            match &*broadcasts.read() {
                None => rsx! {
                    div { class: "loading", "読み込み中..." }
                },
                Some(Err(e)) => rsx! {
                    div { class: "error-banner", "放送一覧を取得できませんでした: {e}" }
                },
                Some(Ok(list)) if list.is_empty() => rsx! {
                    div { class: "empty-state", "まだ放送がありません" }
                },
                Some(Ok(list)) => rsx! {
                    ul { class: "broadcast-list",
                        for broadcast in list.iter().cloned() {
                            BroadcastRow {
                                key: "{broadcast.id}",
                                broadcast,
                                editable: session.is_admin(),
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn BroadcastRow(broadcast: Broadcast, editable: bool) -> Element {
    let upcoming = broadcast.broad_casting_date >= Utc::now().date_naive();
    let date = broadcast.date_string();

    rsx! {
        li { class: "broadcast-row",
            Link {
                to: AppRoute::BroadcastDone { id: broadcast.id.clone() }.path(),
                class: "broadcast-link",
                span { class: "broadcast-date", "{date}" }
                span { class: "broadcast-title", "{broadcast.title}" }
                if upcoming {
                    span { class: "badge badge-upcoming", "配信予定" }
                } else if broadcast.has_recording() {
                    span { class: "badge badge-recorded", "録画あり" }
                }
            }
            if editable {
                Link {
                    to: AppRoute::Registration { id: Some(broadcast.id.clone()) }.path(),
                    class: "btn btn-secondary btn-sm",
                    "編集"
                }
            }
        }
    }
}
