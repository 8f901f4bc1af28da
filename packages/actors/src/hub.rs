//! Hub actor keeping one subscription per broadcast for polling clients.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use engivia_core::{BroadcastId, SnapshotBatch};
use ractor::rpc::CallResult;
use ractor::{Actor, ActorProcessingErr, ActorRef, ActorStatus, RpcReplyPort, SupervisionEvent};

use crate::messages::{HubMessage, SubscriptionMessage};
use crate::source::{SnapshotSource, SubscribeError};
use crate::subscription::{
    BroadcastSubscription, DEFAULT_LOG_CAPACITY, Sequencer, SubscriptionOptions,
};

/// Timing and sizing for the hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// How long a poll waits for a new snapshot before answering empty.
    pub poll_timeout: Duration,
    /// Subscriptions not polled for this long are stopped.
    pub idle_timeout: Duration,
    /// Interval between idle sweeps.
    pub tick_interval: Duration,
    /// Snapshots retained per subscription.
    pub log_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(25),
            idle_timeout: Duration::from_secs(120),
            tick_interval: Duration::from_secs(30),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Arguments for starting the hub.
pub struct HubArgs<S> {
    pub source: S,
    pub config: HubConfig,
}

struct HubEntry {
    subscription: BroadcastSubscription,
    last_polled: Instant,
}

type PollReply = RpcReplyPort<Result<SnapshotBatch, SubscribeError>>;

/// State for the hub actor.
pub struct HubState<S> {
    source: Arc<S>,
    config: HubConfig,
    sequencer: Sequencer,
    entries: HashMap<BroadcastId, HubEntry>,
    /// Polls waiting on a subscription that is still being opened.
    opening: HashMap<BroadcastId, Vec<(u64, PollReply)>>,
}

impl<S: SnapshotSource> HubState<S> {
    /// Queue a poll for a broadcast without a subscription, opening one in a
    /// background task unless that is already under way.
    fn open_for(
        &mut self,
        myself: &ActorRef<HubMessage>,
        broadcast_id: BroadcastId,
        after: u64,
        reply: PollReply,
    ) {
        let pending = self.opening.entry(broadcast_id.clone()).or_default();
        pending.push((after, reply));
        if pending.len() > 1 {
            return;
        }

        let source = Arc::clone(&self.source);
        let options = SubscriptionOptions {
            supervisor: Some(myself.get_cell()),
            sequencer: self.sequencer.clone(),
            log_capacity: self.config.log_capacity,
        };
        let hub = myself.clone();
        tokio::spawn(async move {
            let result =
                BroadcastSubscription::start(broadcast_id.clone(), source.as_ref(), options).await;
            // If the hub is gone the subscription is dropped here, which cancels it.
            let _ = hub.send_message(HubMessage::Opened {
                broadcast_id,
                result,
            });
        });
    }

    fn opened(
        &mut self,
        broadcast_id: BroadcastId,
        result: Result<BroadcastSubscription, SubscribeError>,
    ) {
        let pending = self.opening.remove(&broadcast_id).unwrap_or_default();

        let subscription = match result {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!("Failed to subscribe to broadcast {}: {}", broadcast_id, e);
                for (_, reply) in pending {
                    let _ = reply.send(Err(e.clone()));
                }
                return;
            }
        };

        // Unsubscribed while opening; dropping cancels it.
        if pending.is_empty() {
            return;
        }

        let actor = subscription.actor().clone();
        let stopped = matches!(
            actor.get_status(),
            ActorStatus::Stopping | ActorStatus::Stopped
        );
        if !stopped {
            self.entries.insert(
                broadcast_id.clone(),
                HubEntry {
                    subscription,
                    last_polled: Instant::now(),
                },
            );
            tracing::info!(
                "Hub subscribed to broadcast {} ({} active)",
                broadcast_id,
                self.entries.len()
            );
        }

        for (after, reply) in pending {
            forward_poll(actor.clone(), after, reply, self.config.poll_timeout);
        }
    }

    /// Answer every queued poll empty.
    fn release_opening(&mut self, broadcast_id: Option<&BroadcastId>) {
        let released: Vec<(u64, PollReply)> = match broadcast_id {
            Some(id) => self.opening.remove(id).unwrap_or_default(),
            None => self.opening.drain().flat_map(|(_, pending)| pending).collect(),
        };
        for (_, reply) in released {
            let _ = reply.send(Ok(SnapshotBatch::default()));
        }
    }
}

/// Wait for the subscription's answer outside the hub's mailbox so one slow
/// poll does not block others.
fn forward_poll(
    actor: ActorRef<SubscriptionMessage>,
    after: u64,
    reply: PollReply,
    poll_timeout: Duration,
) {
    tokio::spawn(async move {
        let result = match actor
            .call(
                |reply| SubscriptionMessage::Poll { after, reply },
                Some(poll_timeout),
            )
            .await
        {
            Ok(CallResult::Success(batch)) => Ok(batch),
            Ok(CallResult::Timeout) => Ok(SnapshotBatch::default()),
            Ok(CallResult::SenderError) | Err(_) => Err(SubscribeError::Closed),
        };
        let _ = reply.send(result);
    });
}

/// Hub actor that shares broadcast subscriptions between polling clients.
pub struct SubscriptionHub<S> {
    _source: PhantomData<fn() -> S>,
}

impl<S> SubscriptionHub<S> {
    pub fn new() -> Self {
        Self {
            _source: PhantomData,
        }
    }
}

impl<S> Default for SubscriptionHub<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SnapshotSource> Actor for SubscriptionHub<S> {
    type Msg = HubMessage;
    type State = HubState<S>;
    type Arguments = HubArgs<S>;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting subscription hub");

        // Start periodic tick
        let tick_interval = args.config.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            loop {
                interval.tick().await;
                if myself.send_message(HubMessage::Tick).is_err() {
                    break;
                }
            }
        });

        Ok(HubState {
            source: Arc::new(args.source),
            config: args.config,
            sequencer: Sequencer::new(),
            entries: HashMap::new(),
            opening: HashMap::new(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            HubMessage::Poll {
                broadcast_id,
                after,
                reply,
            } => match state.entries.get_mut(&broadcast_id) {
                Some(entry) => {
                    entry.last_polled = Instant::now();
                    let actor = entry.subscription.actor().clone();
                    forward_poll(actor, after, reply, state.config.poll_timeout);
                }
                None => state.open_for(&myself, broadcast_id, after, reply),
            },

            HubMessage::Opened {
                broadcast_id,
                result,
            } => state.opened(broadcast_id, result),

            HubMessage::ListActive { reply } => {
                let mut ids: Vec<BroadcastId> = state.entries.keys().cloned().collect();
                ids.sort();
                let _ = reply.send(ids);
            }

            HubMessage::Unsubscribe { broadcast_id } => {
                state.release_opening(Some(&broadcast_id));
                if state.entries.remove(&broadcast_id).is_some() {
                    tracing::info!("Hub unsubscribed from broadcast {}", broadcast_id);
                }
            }

            HubMessage::Shutdown => {
                tracing::info!("Shutting down subscription hub");
                state.release_opening(None);
                state.entries.clear();
                myself.stop(None);
                return Ok(());
            }

            HubMessage::Tick => {
                let idle_timeout = state.config.idle_timeout;
                let before = state.entries.len();
                state
                    .entries
                    .retain(|_, entry| entry.last_polled.elapsed() < idle_timeout);
                let stopped = before - state.entries.len();
                if stopped > 0 {
                    tracing::info!("Stopped {} idle subscription(s)", stopped);
                }
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let (cell, reason) = match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => (cell, reason),
            SupervisionEvent::ActorFailed(cell, error) => (cell, Some(error.to_string())),
            _ => return Ok(()),
        };

        // A newer subscription for the same broadcast may already be in place.
        let stopped = cell.get_id();
        state.entries.retain(|broadcast_id, entry| {
            if entry.subscription.actor_id() != stopped {
                return true;
            }
            tracing::warn!(
                "Subscription for broadcast {} stopped: {:?}",
                broadcast_id,
                reason
            );
            false
        });

        Ok(())
    }
}

/// Start the hub over the given snapshot source.
pub async fn start_hub<S: SnapshotSource>(
    source: S,
    config: HubConfig,
) -> Result<(ActorRef<HubMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let (actor, handle) =
        Actor::spawn(None, SubscriptionHub::<S>::new(), HubArgs { source, config }).await?;

    Ok((actor, handle))
}

/// Long-poll a broadcast through the hub.
///
/// Waits a little longer than the hub's own poll timeout so the hub's empty
/// answer arrives first.
pub async fn poll_broadcast(
    hub: &ActorRef<HubMessage>,
    broadcast_id: BroadcastId,
    after: u64,
    poll_timeout: Duration,
) -> Result<SnapshotBatch, SubscribeError> {
    match hub
        .call(
            |reply| HubMessage::Poll {
                broadcast_id,
                after,
                reply,
            },
            Some(poll_timeout + Duration::from_secs(5)),
        )
        .await
    {
        Ok(CallResult::Success(result)) => result,
        Ok(CallResult::Timeout) => Ok(SnapshotBatch::default()),
        Ok(CallResult::SenderError) | Err(_) => Err(SubscribeError::Closed),
    }
}
