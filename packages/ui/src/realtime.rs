//! Live broadcast snapshots in the browser.
//!
//! The hook long-polls the server's subscription hub. The polling future is
//! owned by a resource keyed on the broadcast id, so switching ids restarts it
//! and unmounting the page cancels it; nothing is delivered afterwards.

use dioxus::prelude::*;
use engivia_core::controller::BroadcastDoneController;
use engivia_core::{BroadcastId, Notice};

use crate::timer::sleep_ms;
use crate::toast::{Toasts, use_toasts};

/// Delay before polling again after a failed poll.
const RETRY_DELAY_MS: u32 = 3000;

/// Keep `controller` up to date with the broadcast named by `id`. A new id
/// resets the controller; the engivia list is loaded by the page.
pub fn use_broadcast_snapshots(id: BroadcastId, controller: Signal<BroadcastDoneController>) {
    let toasts = use_toasts();

    let _ = use_resource(use_reactive!(|(id,)| async move {
        follow(id, controller, toasts).await
    }));
}

async fn follow(id: BroadcastId, mut controller: Signal<BroadcastDoneController>, mut toasts: Toasts) {
    if controller.peek().broadcast_id() != &id {
        controller.set(BroadcastDoneController::new(id.clone()));
    }

    let mut failing = false;
    loop {
        let cursor = controller.peek().cursor();
        match api::poll_broadcast(id.clone(), cursor).await {
            Ok(batch) => {
                failing = false;
                if !batch.snapshots.is_empty() || batch.lagged {
                    controller.write().apply_batch(batch);
                }
            }
            Err(e) => {
                tracing::warn!(broadcast_id = %id, "Broadcast poll failed: {}", e);
                // One notice per outage, not one per retry.
                if !failing {
                    toasts.push(Notice::error("放送の更新を受信できません。再接続しています"));
                }
                failing = true;
                sleep_ms(RETRY_DELAY_MS).await;
            }
        }
    }
}
