// Dioxus `rsx!` macro expands to unwraps internally; allow to avoid false positives.
#![allow(clippy::disallowed_methods)]

use dioxus::prelude::*;
use engivia_core::{AppRoute, BroadcastId};

use ui::AppProviders;
use ui::pages::{
    BroadcastDonePage, BroadcastsPage, LandingPage, LoginPage, RegistrationPage, UserAccountPage,
};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppLayout)]
        #[route("/")]
        Landing {},
        #[route("/login?:code&:state")]
        Login { code: String, state: String },
        #[route("/broadcasts")]
        Broadcasts {},
        #[route("/admin/broadcast-registration?:id")]
        Registration { id: String },
        #[route("/broadcast-done?:id")]
        BroadcastDone { id: String },
        #[route("/users/user-account")]
        UserAccount {},
    #[end_layout]
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
        tracing::info!("Starting engivia web server");
    }

    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Title { "エンジビアの泉" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AppProviders {
            Router::<Route> {}
        }
    }
}

#[component]
fn AppLayout() -> Element {
    rsx! {
        main { class: "app-main",
            Outlet::<Route> {}
        }
    }
}

#[component]
fn Landing() -> Element {
    rsx! { LandingPage {} }
}

#[component]
fn Login(code: String, state: String) -> Element {
    rsx! { LoginPage { code, state } }
}

#[component]
fn Broadcasts() -> Element {
    rsx! { BroadcastsPage {} }
}

/// An empty or missing `id` opens the page in create mode.
#[component]
fn Registration(id: String) -> Element {
    rsx! { RegistrationPage { id: BroadcastId::parse(&id) } }
}

#[component]
fn BroadcastDone(id: String) -> Element {
    match BroadcastId::parse(&id) {
        Some(id) => rsx! { BroadcastDonePage { id } },
        None => rsx! { MissingBroadcast {} },
    }
}

#[component]
fn UserAccount() -> Element {
    rsx! { UserAccountPage {} }
}

/// `/broadcast-done` without an id has nothing to show.
#[component]
fn MissingBroadcast() -> Element {
    let navigator = use_navigator();
    use_effect(move || {
        navigator.replace(AppRoute::Broadcasts.path());
    });
    rsx! {}
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "page-container",
            h1 { class: "page-title", "ページが見つかりません" }
            p { class: "page-description", "/{path}" }
            Link { to: Route::Broadcasts {}, class: "btn btn-secondary", "放送一覧へ" }
        }
    }
}
