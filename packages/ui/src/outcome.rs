use dioxus::prelude::*;
use dioxus::router::Navigator;
use engivia_core::controller::Outcome;

use crate::session::{SessionContext, use_session};
use crate::toast::{Toasts, use_toasts};

/// Carry out what a controller transition asked for: install a refreshed
/// session, show the notice, then navigate.
pub fn apply_outcome(
    outcome: Outcome,
    mut session: SessionContext,
    mut toasts: Toasts,
    navigator: Navigator,
) {
    if let Some(refreshed) = outcome.session {
        session.set(Some(refreshed));
    }
    if let Some(notice) = outcome.notice {
        toasts.push(notice);
    }
    if let Some(route) = outcome.navigate {
        navigator.push(route.path());
    }
}

/// [`apply_outcome`] bound to the current contexts.
pub fn use_outcome() -> impl Fn(Outcome) + Copy {
    let session = use_session();
    let toasts = use_toasts();
    let navigator = use_navigator();
    move |outcome| apply_outcome(outcome, session, toasts, navigator)
}
