// ── Polling subscriptions ──
//
// Simulates a live feed over a pull-only API: fetch once immediately,
// then once per period, until cancelled. Each tick's fetch runs in its
// own task so a slow request never delays the schedule.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::Stream;
use medtrack_api::Document;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::source::CollectionSource;

/// Shortest period accepted; zero would spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

type Callback = dyn Fn(Vec<Document>) + Send + Sync + 'static;

// ── PollingManager ───────────────────────────────────────────────

/// Vends polling [`Subscription`]s over a shared [`CollectionSource`].
///
/// Cheaply cloneable. Subscriptions are independent: two subscriptions to
/// the same collection poll twice.
pub struct PollingManager<S> {
    source: Arc<S>,
}

impl<S> Clone for PollingManager<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: CollectionSource> PollingManager<S> {
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<S>) -> Self {
        Self { source }
    }

    /// The source every subscription polls through.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Start polling `collection`, handing every successful fetch to
    /// `callback`.
    ///
    /// The first fetch is issued before this returns, even if the handle is
    /// cancelled or dropped straight away; later ones every `interval`,
    /// measured from the previous tick's schedule rather than its
    /// completion. Failed fetches are logged and skipped; they never reach
    /// the callback and never stop the loop.
    ///
    /// Fetches can overlap when one takes longer than `interval`, in which
    /// case the callback sees results in completion order. Cancelling the
    /// returned [`Subscription`] stops future ticks only: a fetch already in
    /// flight may still deliver afterwards.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(
        &self,
        collection: impl Into<String>,
        callback: F,
        interval: Duration,
    ) -> Subscription
    where
        F: Fn(Vec<Document>) + Send + Sync + 'static,
    {
        let collection: Arc<str> = Arc::from(collection.into());
        let interval = if interval < MIN_POLL_INTERVAL {
            warn!(?interval, "poll interval too small, clamping");
            MIN_POLL_INTERVAL
        } else {
            interval
        };

        let cancel = CancellationToken::new();
        let counters = Arc::new(TickCounters::default());
        let callback: Arc<Callback> = Arc::new(callback);

        debug!(collection = %collection, ?interval, "subscribing");
        counters.issued.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(fetch_and_deliver(
            Arc::clone(&self.source),
            Arc::clone(&collection),
            Arc::clone(&callback),
            Arc::clone(&counters),
            1,
        ));
        tokio::spawn(poll_task(
            Arc::clone(&self.source),
            Arc::clone(&collection),
            callback,
            interval,
            cancel.clone(),
            Arc::clone(&counters),
        ));

        Subscription {
            collection,
            interval,
            cancel,
            counters,
        }
    }

    /// Like [`subscribe`](Self::subscribe), but delivers snapshots as a
    /// `Stream`. Dropping the stream cancels the subscription.
    pub fn stream(&self, collection: impl Into<String>, interval: Duration) -> SnapshotStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(
            collection,
            move |docs| {
                // Receiver gone means the stream was dropped; the
                // subscription is cancelled along with it.
                let _ = tx.send(docs);
            },
            interval,
        );
        SnapshotStream {
            inner: UnboundedReceiverStream::new(rx),
            subscription,
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct TickCounters {
    issued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time tick counts of a [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    /// Fetches started.
    pub issued: u64,
    /// Fetches whose result reached the callback.
    pub delivered: u64,
    /// Fetches that failed and were swallowed.
    pub failed: u64,
}

/// Handle to a running poll loop.
///
/// [`cancel`](Self::cancel) is idempotent. Dropping the handle cancels too,
/// so keep it alive for as long as updates are wanted.
#[must_use = "dropping a Subscription cancels it"]
#[derive(Debug)]
pub struct Subscription {
    collection: Arc<str>,
    interval: Duration,
    cancel: CancellationToken,
    counters: Arc<TickCounters>,
}

impl Subscription {
    /// Stop issuing fetches. In-flight fetches are not aborted.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!(collection = %self.collection, "unsubscribing");
            self.cancel.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stats(&self) -> TickStats {
        TickStats {
            issued: self.counters.issued.load(Ordering::SeqCst),
            delivered: self.counters.delivered.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ── SnapshotStream ───────────────────────────────────────────────

/// `Stream` of collection snapshots backed by a [`Subscription`].
#[must_use = "streams do nothing unless polled; dropping one cancels it"]
#[derive(Debug)]
pub struct SnapshotStream {
    inner: UnboundedReceiverStream<Vec<Document>>,
    subscription: Subscription,
}

impl SnapshotStream {
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl Stream for SnapshotStream {
    type Item = Vec<Document>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn poll_task<S: CollectionSource>(
    source: Arc<S>,
    collection: Arc<str>,
    callback: Arc<Callback>,
    period: Duration,
    cancel: CancellationToken,
    counters: Arc<TickCounters>,
) {
    // Tick 1 was issued by `subscribe`.
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let tick = counters.issued.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::spawn(fetch_and_deliver(
                    Arc::clone(&source),
                    Arc::clone(&collection),
                    Arc::clone(&callback),
                    Arc::clone(&counters),
                    tick,
                ));
            }
        }
    }

    debug!(collection = %collection, "poll loop stopped");
}

async fn fetch_and_deliver<S: CollectionSource>(
    source: Arc<S>,
    collection: Arc<str>,
    callback: Arc<Callback>,
    counters: Arc<TickCounters>,
    tick: u64,
) {
    match source.list(&collection).await {
        Ok(docs) => {
            trace!(collection = %collection, tick, count = docs.len(), "poll tick delivered");
            counters.delivered.fetch_add(1, Ordering::SeqCst);
            callback(docs);
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!(collection = %collection, tick, error = %e, "poll tick failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedSource, ambient, docs};
    use futures_util::StreamExt;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::{Instant, sleep};

    const SECOND: Duration = Duration::from_millis(1000);

    fn recorder() -> (
        impl Fn(Vec<Document>) + Send + Sync + 'static,
        mpsc::UnboundedReceiver<(Instant, Vec<Document>)>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = move |docs: Vec<Document>| {
            let _ = tx.send((Instant::now(), docs));
        };
        (callback, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_immediately_then_every_interval() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (callback, mut rx) = recorder();
        let start = Instant::now();

        let sub = manager.subscribe("Ambient", callback, SECOND);

        for expected_ms in [0, 1000, 2000, 3000] {
            let (at, docs) = rx.recv().await.unwrap();
            assert_eq!(at.duration_since(start), Duration::from_millis(expected_ms));
            assert_eq!(docs, ambient());
        }
        assert_eq!(sub.collection(), "Ambient");
        assert_eq!(manager.source().listed()[0], "Ambient");
    }

    #[tokio::test(start_paused = true)]
    async fn failing_ticks_do_not_stop_polling() {
        let source = ScriptedSource::new(
            [Reply::fail(500), Reply::fail(500), Reply::fail(500)],
            Reply::ok(ambient()),
        );
        let manager = PollingManager::new(source);
        let (callback, mut rx) = recorder();
        let start = Instant::now();

        let sub = manager.subscribe("Ambient", callback, SECOND);

        let (at, docs) = rx.recv().await.unwrap();
        assert_eq!(at.duration_since(start), 3 * SECOND);
        assert_eq!(docs, ambient());
        assert!(rx.try_recv().is_err());

        let stats = sub.stats();
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.issued, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_ticks() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (callback, mut rx) = recorder();

        let sub = manager.subscribe("Ambient", callback, SECOND);
        rx.recv().await.unwrap();

        sub.cancel();
        sub.cancel();
        assert!(sub.is_cancelled());

        sleep(5 * SECOND).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
        assert_eq!(sub.stats().issued, 1);
        assert_eq!(manager.source().list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_survives_immediate_cancel() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (callback, mut rx) = recorder();

        let sub = manager.subscribe("Ambient", callback, SECOND);
        sub.cancel();
        assert_eq!(sub.stats().issued, 1);

        sleep(5 * SECOND).await;
        let (_, docs) = rx.recv().await.unwrap();
        assert_eq!(docs, ambient());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
        assert_eq!(manager.source().list_calls(), 1);
        assert_eq!(sub.stats().delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_survives_dropped_handle() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (callback, mut rx) = recorder();

        drop(manager.subscribe("Ambient", callback, SECOND));

        sleep(5 * SECOND).await;
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
        assert_eq!(manager.source().list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_fetch_survives_cancel() {
        let source = ScriptedSource::always(Reply::ok(ambient()).after(Duration::from_millis(500)));
        let manager = PollingManager::new(source);
        let (callback, mut rx) = recorder();
        let start = Instant::now();

        let sub = manager.subscribe("Ambient", callback, SECOND);
        sleep(Duration::from_millis(100)).await;
        sub.cancel();

        let (at, _) = rx.recv().await.unwrap();
        assert_eq!(at.duration_since(start), Duration::from_millis(500));

        sleep(5 * SECOND).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(sub.stats().issued, 1);
        assert_eq!(sub.stats().delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_delivers_in_completion_order() {
        let slow = docs(json!([{"id": "slow"}]));
        let fast = docs(json!([{"id": "fast"}]));
        let source = ScriptedSource::new(
            [
                Reply::ok(slow.clone()).after(Duration::from_millis(2500)),
                Reply::ok(fast.clone()),
            ],
            Reply::fail(500),
        );
        let manager = PollingManager::new(source);
        let (callback, mut rx) = recorder();
        let start = Instant::now();

        let _sub = manager.subscribe("medicine", callback, SECOND);

        let (at, first) = rx.recv().await.unwrap();
        assert_eq!(first, fast);
        assert_eq!(at.duration_since(start), SECOND);

        let (at, second) = rx.recv().await.unwrap();
        assert_eq!(second, slow);
        assert_eq!(at.duration_since(start), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (callback, mut rx) = recorder();

        let sub = manager.subscribe("Ambient", callback, SECOND);
        rx.recv().await.unwrap();
        drop(sub);

        sleep(3 * SECOND).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(manager.source().list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_subscriptions_poll_independently() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (first, mut rx1) = recorder();
        let (second, mut rx2) = recorder();

        let _a = manager.subscribe("Ambient", first, SECOND);
        let _b = manager.subscribe("Ambient", second, SECOND);

        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
        assert_eq!(manager.source().list_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_yields_snapshots_on_schedule() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let start = Instant::now();

        let mut stream = manager.stream("Ambient", SECOND);
        assert_eq!(stream.next().await.unwrap(), ambient());
        assert_eq!(stream.next().await.unwrap(), ambient());
        assert_eq!(start.elapsed(), SECOND);
        assert_eq!(stream.subscription().stats().delivered, 2);

        drop(stream);
        sleep(3 * SECOND).await;
        assert_eq!(manager.source().list_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped() {
        let manager = PollingManager::new(ScriptedSource::always(Reply::ok(ambient())));
        let (callback, _rx) = recorder();

        let sub = manager.subscribe("Ambient", callback, Duration::ZERO);
        assert_eq!(sub.interval(), MIN_POLL_INTERVAL);
    }
}
