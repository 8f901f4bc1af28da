//! Subscription actor and the cancellable handle the hub keeps for it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use engivia_core::{Broadcast, BroadcastId, BroadcastSnapshot, SnapshotBatch};
use futures_util::StreamExt;
use ractor::{Actor, ActorCell, ActorId, ActorProcessingErr, ActorRef, RpcReplyPort};
use tokio::task::JoinHandle;

use crate::messages::SubscriptionMessage;
use crate::source::{SnapshotSource, SnapshotStream, SubscribeError};

/// Snapshots retained per subscription for long-polling clients.
pub const DEFAULT_LOG_CAPACITY: usize = 64;

/// Hands out snapshot sequence numbers.
///
/// Shared by every subscription of a hub so numbers keep increasing when a
/// broadcast is re-subscribed.
#[derive(Debug, Clone, Default)]
pub struct Sequencer(Arc<AtomicU64>);

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Arguments for spawning a [`SubscriptionActor`].
pub struct SubscriptionArgs {
    pub broadcast_id: BroadcastId,
    pub stream: SnapshotStream,
    pub sequencer: Sequencer,
    pub log_capacity: usize,
}

/// State for the subscription actor.
pub struct SubscriptionState {
    broadcast_id: BroadcastId,
    sequencer: Sequencer,
    log: VecDeque<BroadcastSnapshot>,
    log_capacity: usize,
    /// Highest sequence number evicted from the log.
    evicted_through: u64,
    waiters: Vec<(u64, RpcReplyPort<SnapshotBatch>)>,
    pump: Option<JoinHandle<()>>,
}

impl SubscriptionState {
    fn record(&mut self, broadcast: Option<Broadcast>) -> BroadcastSnapshot {
        let snapshot = BroadcastSnapshot {
            seq: self.sequencer.next(),
            broadcast,
            observed_at: Utc::now(),
        };
        self.log.push_back(snapshot.clone());
        while self.log.len() > self.log_capacity {
            if let Some(evicted) = self.log.pop_front() {
                self.evicted_through = evicted.seq;
            }
        }
        snapshot
    }

    fn last_seq(&self) -> u64 {
        self.log.back().map_or(self.evicted_through, |s| s.seq)
    }

    /// Snapshots newer than `after`.
    ///
    /// A cursor older than the retained log, or newer than anything this
    /// subscription has numbered, yields the whole log flagged as lagged.
    fn batch_after(&self, after: u64) -> SnapshotBatch {
        let ahead = !self.log.is_empty() && after > self.last_seq();
        if after < self.evicted_through || ahead {
            return SnapshotBatch {
                snapshots: self.log.iter().cloned().collect(),
                lagged: true,
            };
        }
        SnapshotBatch {
            snapshots: self
                .log
                .iter()
                .filter(|s| s.seq > after)
                .cloned()
                .collect(),
            lagged: false,
        }
    }

    fn wake_waiters(&mut self) {
        let waiters = std::mem::take(&mut self.waiters);
        for (after, reply) in waiters {
            if reply.is_closed() {
                continue;
            }
            let _ = reply.send(self.batch_after(after));
        }
    }
}

/// Actor owning one broadcast's snapshot stream.
///
/// A pump task forwards stream items into the mailbox, so snapshots are
/// numbered and delivered in store emission order.
pub struct SubscriptionActor;

impl Actor for SubscriptionActor {
    type Msg = SubscriptionMessage;
    type State = SubscriptionState;
    type Arguments = SubscriptionArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting subscription for broadcast {}", args.broadcast_id);

        let mut stream = args.stream;
        let pump = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                if myself.send_message(SubscriptionMessage::Item(item)).is_err() {
                    return;
                }
            }
            let _ = myself.send_message(SubscriptionMessage::Ended);
        });

        Ok(SubscriptionState {
            broadcast_id: args.broadcast_id,
            sequencer: args.sequencer,
            log: VecDeque::with_capacity(args.log_capacity),
            log_capacity: args.log_capacity.max(1),
            evicted_through: 0,
            waiters: Vec::new(),
            pump: Some(pump),
        })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Some(pump) = state.pump.take() {
            pump.abort();
        }
        for (_, reply) in state.waiters.drain(..) {
            let _ = reply.send(SnapshotBatch::default());
        }
        tracing::info!("Stopped subscription for broadcast {}", state.broadcast_id);
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SubscriptionMessage::Item(Ok(broadcast)) => {
                let snapshot = state.record(broadcast);
                tracing::debug!(
                    broadcast_id = %state.broadcast_id,
                    seq = snapshot.seq,
                    exists = snapshot.broadcast.is_some(),
                    "Snapshot"
                );
                state.wake_waiters();
            }

            SubscriptionMessage::Item(Err(e)) => {
                tracing::warn!("Subscription for broadcast {} failed: {}", state.broadcast_id, e);
                myself.stop(Some(e.to_string()));
            }

            SubscriptionMessage::Ended => {
                tracing::info!("Snapshot stream for broadcast {} ended", state.broadcast_id);
                myself.stop(None);
            }

            SubscriptionMessage::Poll { after, reply } => {
                let batch = state.batch_after(after);
                if batch.snapshots.is_empty() {
                    state.waiters.retain(|(_, waiter)| !waiter.is_closed());
                    state.waiters.push((after, reply));
                } else {
                    let _ = reply.send(batch);
                }
            }
        }

        Ok(())
    }
}

/// How [`BroadcastSubscription::start`] sets up the actor.
#[derive(Clone)]
pub struct SubscriptionOptions {
    /// Actor notified when the subscription stops.
    pub supervisor: Option<ActorCell>,
    pub sequencer: Sequencer,
    pub log_capacity: usize,
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        Self {
            supervisor: None,
            sequencer: Sequencer::new(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// A running subscription to one broadcast.
///
/// Cancellation happens exactly once: explicitly through [`cancel`], or on
/// drop. Waiting polls are answered empty when it stops.
///
/// [`cancel`]: BroadcastSubscription::cancel
pub struct BroadcastSubscription {
    broadcast_id: BroadcastId,
    actor: ActorRef<SubscriptionMessage>,
    cancelled: bool,
}

impl BroadcastSubscription {
    /// Open `source` for `broadcast_id` and spawn the actor following it.
    pub async fn start<S: SnapshotSource>(
        broadcast_id: BroadcastId,
        source: &S,
        options: SubscriptionOptions,
    ) -> Result<Self, SubscribeError> {
        let stream = source.open(&broadcast_id).await?;

        let args = SubscriptionArgs {
            broadcast_id: broadcast_id.clone(),
            stream,
            sequencer: options.sequencer,
            log_capacity: options.log_capacity,
        };

        let spawned = match options.supervisor {
            Some(supervisor) => {
                Actor::spawn_linked(None, SubscriptionActor, args, supervisor).await
            }
            None => Actor::spawn(None, SubscriptionActor, args).await,
        };
        let (actor, _handle) = spawned.map_err(|e| SubscribeError::Spawn(e.to_string()))?;

        Ok(Self {
            broadcast_id,
            actor,
            cancelled: false,
        })
    }

    pub fn broadcast_id(&self) -> &BroadcastId {
        &self.broadcast_id
    }

    pub(crate) fn actor(&self) -> &ActorRef<SubscriptionMessage> {
        &self.actor
    }

    pub(crate) fn actor_id(&self) -> ActorId {
        self.actor.get_id()
    }

    /// Stop the subscription. Returns `true` only for the call that actually
    /// cancelled it.
    pub fn cancel(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        self.actor.stop(None);
        tracing::debug!(broadcast_id = %self.broadcast_id, "Subscription cancelled");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl std::fmt::Debug for BroadcastSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastSubscription")
            .field("broadcast_id", &self.broadcast_id)
            .field("actor", &self.actor.get_id())
            .field("cancelled", &self.cancelled)
            .finish()
    }
}

impl Drop for BroadcastSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
