//! This crate contains all shared UI for the workspace.
//!
//! Pages are route-agnostic: they navigate by path, so the binary crate only
//! has to map its routes onto them.

// Dioxus `rsx!` macro expands to unwraps internally; allow to avoid false positives.
#![allow(clippy::disallowed_methods)]

mod components;
mod outcome;
pub mod pages;
mod realtime;
mod session;
mod store;
mod timer;
mod toast;

pub use components::{AppHeader, ConfirmDialog, FieldError};
pub use outcome::{apply_outcome, use_outcome};
pub use realtime::use_broadcast_snapshots;
pub use session::{SessionContext, use_session};
pub use store::ApiStore;
pub use toast::{ToastHost, Toasts, use_toasts};

use dioxus::prelude::*;

/// Provides the session and toast contexts to everything below it, and
/// resumes a sign-in remembered from an earlier visit.
#[component]
pub fn AppProviders(children: Element) -> Element {
    let session = use_context_provider(SessionContext::new);
    use_context_provider(Toasts::new);
    use_future(move || session.resume());

    rsx! {
        {children}
        ToastHost {}
    }
}
