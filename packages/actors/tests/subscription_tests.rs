#![allow(clippy::disallowed_methods)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actors::{
    ActorRef, BroadcastSubscription, HubConfig, HubMessage, SnapshotSource, SnapshotStream,
    SubscribeError, SubscriptionOptions, poll_broadcast, start_hub,
};
use chrono::NaiveDate;
use engivia_core::{Broadcast, BroadcastId};
use futures_util::StreamExt;
use ractor::rpc::CallResult;
use tokio::sync::{Notify, mpsc};

type Feed = mpsc::UnboundedSender<Result<Option<Broadcast>, SubscribeError>>;

const WAIT: Duration = Duration::from_secs(2);

/// Snapshot source whose streams are fed by the test.
#[derive(Clone, Default)]
struct FakeSource {
    feeds: Arc<Mutex<Vec<(BroadcastId, Feed)>>>,
    gates: Arc<Mutex<HashMap<BroadcastId, Arc<Notify>>>>,
}

impl FakeSource {
    /// The most recently opened feed for `id`, waiting for it to appear.
    async fn feed(&self, id: &BroadcastId) -> Feed {
        let found = tokio::time::timeout(WAIT, async {
            loop {
                let latest = self
                    .feeds
                    .lock()
                    .unwrap()
                    .iter()
                    .rev()
                    .find(|(feed_id, _)| feed_id == id)
                    .map(|(_, feed)| feed.clone());
                if let Some(feed) = latest {
                    return feed;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        found.expect("feed was never opened")
    }

    /// Like [`FakeSource::feed`], but hands over the only sender so that
    /// dropping it ends the stream.
    async fn take_feed(&self, id: &BroadcastId) -> Feed {
        let feed = self.feed(id).await;
        let mut feeds = self.feeds.lock().unwrap();
        if let Some(pos) = feeds.iter().rposition(|(feed_id, _)| feed_id == id) {
            feeds.remove(pos);
        }
        feed
    }

    /// Hold the next open of `id` until the returned gate is notified.
    fn stall(&self, id: &BroadcastId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(id.clone(), Arc::clone(&gate));
        gate
    }

    fn opened(&self, id: &BroadcastId) -> usize {
        self.feeds
            .lock()
            .unwrap()
            .iter()
            .filter(|(feed_id, _)| feed_id == id)
            .count()
    }
}

impl SnapshotSource for FakeSource {
    fn open(
        &self,
        broadcast_id: &BroadcastId,
    ) -> impl Future<Output = Result<SnapshotStream, SubscribeError>> + Send {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().unwrap().push((broadcast_id.clone(), tx));
        let stream: SnapshotStream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed();
        let gate = self.gates.lock().unwrap().remove(broadcast_id);
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            Ok(stream)
        }
    }
}

fn id(s: &str) -> BroadcastId {
    BroadcastId::parse(s).unwrap()
}

fn broadcast(id_str: &str, title: &str) -> Broadcast {
    Broadcast {
        id: id(id_str),
        title: title.to_string(),
        broad_casting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        broad_cast_url: None,
    }
}

async fn active(hub: &ActorRef<HubMessage>) -> Vec<BroadcastId> {
    match hub
        .call(|reply| HubMessage::ListActive { reply }, Some(WAIT))
        .await
        .unwrap()
    {
        CallResult::Success(ids) => ids,
        _ => panic!("hub did not answer"),
    }
}

async fn closed(feed: &Feed) -> bool {
    tokio::time::timeout(WAIT, feed.closed()).await.is_ok()
}

#[tokio::test]
async fn cancel_happens_once_and_releases_the_stream() {
    let source = FakeSource::default();
    let mut subscription =
        BroadcastSubscription::start(id("b1"), &source, SubscriptionOptions::default())
            .await
            .unwrap();
    let feed = source.feed(&id("b1")).await;
    feed.send(Ok(Some(broadcast("b1", "A")))).unwrap();
    assert_eq!(subscription.broadcast_id(), &id("b1"));

    assert!(subscription.cancel());
    assert!(!subscription.cancel());
    assert!(subscription.is_cancelled());
    assert!(closed(&feed).await, "stream should be released after cancel");
}

#[tokio::test]
async fn dropping_the_subscription_cancels_it() {
    let source = FakeSource::default();
    let subscription =
        BroadcastSubscription::start(id("b1"), &source, SubscriptionOptions::default())
            .await
            .unwrap();
    let feed = source.feed(&id("b1")).await;

    drop(subscription);

    assert!(closed(&feed).await);
}

#[tokio::test]
async fn stream_end_removes_the_subscription() {
    let source = FakeSource::default();
    let config = HubConfig {
        poll_timeout: Duration::from_millis(300),
        ..HubConfig::default()
    };
    let poll_timeout = config.poll_timeout;
    let (hub, _handle) = start_hub(source.clone(), config).await.unwrap();

    let pending = tokio::spawn({
        let hub = hub.clone();
        async move { poll_broadcast(&hub, id("b1"), 0, poll_timeout).await }
    });
    let feed = source.take_feed(&id("b1")).await;
    feed.send(Ok(Some(broadcast("b1", "A")))).unwrap();
    assert_eq!(pending.await.unwrap().unwrap().snapshots.len(), 1);
    assert_eq!(active(&hub).await, vec![id("b1")]);

    drop(feed);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(active(&hub).await.is_empty());

    hub.stop(None);
}

#[tokio::test]
async fn slow_opens_do_not_hold_up_other_broadcasts() {
    let source = FakeSource::default();
    let config = HubConfig {
        poll_timeout: Duration::from_millis(300),
        ..HubConfig::default()
    };
    let poll_timeout = config.poll_timeout;
    let (hub, _handle) = start_hub(source.clone(), config).await.unwrap();
    let gate = source.stall(&id("slow"));

    let slow: Vec<_> = (0..2)
        .map(|_| {
            let hub = hub.clone();
            tokio::spawn(async move { poll_broadcast(&hub, id("slow"), 0, poll_timeout).await })
        })
        .collect();

    // served while "slow" is still opening
    let fast = tokio::spawn({
        let hub = hub.clone();
        async move { poll_broadcast(&hub, id("fast"), 0, poll_timeout).await }
    });
    let fast_feed = source.feed(&id("fast")).await;
    fast_feed.send(Ok(Some(broadcast("fast", "F")))).unwrap();
    let batch = tokio::time::timeout(WAIT, fast).await.unwrap().unwrap().unwrap();
    assert_eq!(batch.snapshots.len(), 1);
    assert_eq!(active(&hub).await, vec![id("fast")]);

    gate.notify_one();
    let slow_feed = source.feed(&id("slow")).await;
    slow_feed.send(Ok(Some(broadcast("slow", "S")))).unwrap();
    for poll in slow {
        let batch = tokio::time::timeout(WAIT, poll).await.unwrap().unwrap().unwrap();
        assert_eq!(batch.snapshots.len(), 1);
    }

    // polls queued during the open share one subscription
    assert_eq!(source.opened(&id("slow")), 1);
    assert_eq!(active(&hub).await, vec![id("fast"), id("slow")]);

    hub.stop(None);
}

#[tokio::test]
async fn hub_answers_long_polls_in_order() {
    let source = FakeSource::default();
    let config = HubConfig {
        poll_timeout: Duration::from_millis(300),
        ..HubConfig::default()
    };
    let poll_timeout = config.poll_timeout;
    let (hub, _handle) = start_hub(source.clone(), config).await.unwrap();

    // first poll subscribes and waits for the initial snapshot
    let pending = tokio::spawn({
        let hub = hub.clone();
        async move { poll_broadcast(&hub, id("b1"), 0, poll_timeout).await }
    });
    let feed = source.feed(&id("b1")).await;
    feed.send(Ok(Some(broadcast("b1", "A")))).unwrap();
    let batch = pending.await.unwrap().unwrap();
    assert_eq!(batch.snapshots.len(), 1);
    assert!(!batch.lagged);
    let cursor = batch.next_cursor(0);

    // nothing new: the poll times out empty
    let empty = poll_broadcast(&hub, id("b1"), cursor, poll_timeout).await.unwrap();
    assert!(empty.snapshots.is_empty());
    assert_eq!(empty.next_cursor(cursor), cursor);

    feed.send(Ok(Some(broadcast("b1", "B")))).unwrap();
    feed.send(Ok(None)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let batch = poll_broadcast(&hub, id("b1"), cursor, poll_timeout).await.unwrap();
    let titles: Vec<Option<String>> = batch
        .snapshots
        .iter()
        .map(|s| s.broadcast.as_ref().map(|b| b.title.clone()))
        .collect();
    assert_eq!(titles, vec![Some("B".to_string()), None]);
    assert!(batch.snapshots[0].seq < batch.snapshots[1].seq);

    // the subscription is shared
    assert_eq!(source.opened(&id("b1")), 1);

    hub.stop(None);
}

#[tokio::test]
async fn hub_flags_clients_that_fell_behind() {
    let source = FakeSource::default();
    let config = HubConfig {
        poll_timeout: Duration::from_millis(300),
        log_capacity: 2,
        ..HubConfig::default()
    };
    let poll_timeout = config.poll_timeout;
    let (hub, _handle) = start_hub(source.clone(), config).await.unwrap();

    let first = tokio::spawn({
        let hub = hub.clone();
        async move { poll_broadcast(&hub, id("b1"), 0, poll_timeout).await }
    });
    let feed = source.feed(&id("b1")).await;
    feed.send(Ok(Some(broadcast("b1", "1")))).unwrap();
    first.await.unwrap().unwrap();

    feed.send(Ok(Some(broadcast("b1", "2")))).unwrap();
    feed.send(Ok(Some(broadcast("b1", "3")))).unwrap();
    feed.send(Ok(Some(broadcast("b1", "4")))).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let batch = poll_broadcast(&hub, id("b1"), 0, poll_timeout).await.unwrap();
    assert!(batch.lagged);
    assert_eq!(batch.snapshots.len(), 2);
    assert_eq!(
        batch.latest().and_then(|s| s.broadcast.as_ref()).map(|b| b.title.as_str()),
        Some("4")
    );

    hub.stop(None);
}

#[tokio::test]
async fn hub_stops_idle_and_failed_subscriptions() {
    let source = FakeSource::default();
    let config = HubConfig {
        poll_timeout: Duration::from_millis(100),
        idle_timeout: Duration::from_millis(50),
        // sweeps are triggered by hand below
        tick_interval: Duration::from_secs(3600),
        ..HubConfig::default()
    };
    let poll_timeout = config.poll_timeout;
    let (hub, _handle) = start_hub(source.clone(), config).await.unwrap();

    poll_broadcast(&hub, id("idle"), 0, poll_timeout).await.unwrap();
    assert_eq!(active(&hub).await, vec![id("idle")]);
    let idle_feed = source.feed(&id("idle")).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    hub.send_message(HubMessage::Tick).unwrap();
    assert!(active(&hub).await.is_empty());
    assert!(closed(&idle_feed).await);

    poll_broadcast(&hub, id("broken"), 0, poll_timeout).await.unwrap();
    let broken_feed = source.feed(&id("broken")).await;
    broken_feed
        .send(Err(SubscribeError::Store("live query killed".into())))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(active(&hub).await.is_empty());

    // the next poll subscribes again
    poll_broadcast(&hub, id("broken"), 0, poll_timeout).await.unwrap();
    assert_eq!(source.opened(&id("broken")), 2);

    hub.send_message(HubMessage::Shutdown).unwrap();
}
