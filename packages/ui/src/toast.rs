//! Transient notices shown on top of every page.

use dioxus::prelude::*;
use engivia_core::{Notice, NoticeKind, NoticePosition};

use crate::timer::sleep_ms;

#[derive(Clone, PartialEq)]
struct ToastItem {
    id: u64,
    notice: Notice,
}

/// Queue of visible toasts.
#[derive(Clone, Copy, PartialEq)]
pub struct Toasts {
    items: Signal<Vec<ToastItem>>,
    next_id: Signal<u64>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            items: Signal::new(Vec::new()),
            next_id: Signal::new(0),
        }
    }

    pub fn push(&mut self, notice: Notice) {
        let id = *self.next_id.peek();
        self.next_id.set(id + 1);
        if notice.is_error() {
            tracing::warn!("{}", notice.message);
        }
        self.items.write().push(ToastItem { id, notice });
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.write().retain(|item| item.id != id);
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_toasts() -> Toasts {
    use_context::<Toasts>()
}

/// Renders the toast queue, one stack per screen position.
#[component]
pub fn ToastHost() -> Element {
    let toasts = use_toasts();
    let items = toasts.items.read().clone();
    let (top, bottom): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|item| item.notice.position == NoticePosition::TopCenter);

    rsx! {
        div { class: "toast-stack toast-top",
            for item in top {
                ToastView { key: "{item.id}", id: item.id, notice: item.notice }
            }
        }
        div { class: "toast-stack toast-bottom",
            for item in bottom {
                ToastView { key: "{item.id}", id: item.id, notice: item.notice }
            }
        }
    }
}

#[component]
fn ToastView(id: u64, notice: Notice) -> Element {
    let mut toasts = use_toasts();
    let duration = u32::try_from(notice.duration_ms).unwrap_or(u32::MAX);

    // The timer belongs to the toast, so it survives page navigation.
    use_future(move || async move {
        sleep_ms(duration).await;
        toasts.dismiss(id);
    });

    let kind_class = match notice.kind {
        NoticeKind::Success => "toast-success",
        NoticeKind::Error => "toast-error",
    };

    rsx! {
        div {
            class: "toast {kind_class}",
            role: "status",
            onclick: move |_| toasts.dismiss(id),
            if let Some(icon) = &notice.icon {
                span { class: "toast-icon", "{icon}" }
            }
            span { class: "toast-message", "{notice.message}" }
        }
    }
}
