// ── Collection view binding ──
//
// Adapts either a one-shot fetch or a live polling subscription into the
// `(data, loading, error)` triple a screen renders, plus a write-through
// `add_item`. State is published through a `watch` channel so any number
// of observers can follow it.

use std::sync::Arc;
use std::time::Duration;

use medtrack_api::{Document, Fields};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::CoreError;
use crate::poll::{PollingManager, Subscription};
use crate::source::CollectionSource;
use crate::stream::ViewStream;

/// Where a binding is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not mounted yet.
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What a screen renders for one collection.
///
/// `data` and `error` are not exclusive: after a failed refresh the last
/// good data stays visible alongside the error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub data: Vec<Document>,
    pub loading: bool,
    pub error: Option<CoreError>,
    pub phase: Phase,
}

impl ViewState {
    fn start_loading(&mut self) {
        self.loading = true;
        self.phase = Phase::Loading;
    }
}

/// Binds one collection to a [`ViewState`].
///
/// In one-shot mode [`mount`](Self::mount) fetches once and
/// [`refresh`](Self::refresh) re-fetches on demand. In realtime mode
/// `mount` starts a polling [`Subscription`] whose every snapshot replaces
/// `data`; per-tick failures are logged by the poller and never surface in
/// `error`.
pub struct CollectionBinding<S: CollectionSource> {
    poller: PollingManager<S>,
    collection: String,
    realtime: bool,
    interval: Duration,
    state: Arc<watch::Sender<Arc<ViewState>>>,
    subscription: Option<Subscription>,
}

impl<S: CollectionSource> CollectionBinding<S> {
    pub fn new(poller: PollingManager<S>, collection: impl Into<String>, realtime: bool) -> Self {
        let (state, _) = watch::channel(Arc::new(ViewState::default()));
        Self {
            poller,
            collection: collection.into(),
            realtime,
            interval: DEFAULT_POLL_INTERVAL,
            state: Arc::new(state),
            subscription: None,
        }
    }

    /// Poll period used in realtime mode.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    /// The live subscription, when mounted in realtime mode.
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Current state (cheap `Arc` clone).
    pub fn state(&self) -> Arc<ViewState> {
        self.state.borrow().clone()
    }

    /// Follow state changes.
    pub fn watch(&self) -> ViewStream {
        ViewStream::new(self.state.subscribe())
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start showing the collection.
    ///
    /// One-shot mode resolves after the fetch completes. Realtime mode
    /// returns right away; data arrives with the first successful tick.
    /// Mounting again restarts any running subscription.
    pub async fn mount(&mut self) {
        self.unmount();
        debug!(collection = %self.collection, realtime = self.realtime, "mounting");
        if self.realtime {
            self.start_polling();
        } else {
            self.load().await;
        }
    }

    /// Stop the realtime subscription, if any. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            debug!(collection = %self.collection, "unmounting");
            subscription.cancel();
        }
    }

    /// Point the binding at another collection or mode.
    ///
    /// No-op when nothing changed; otherwise the old subscription is
    /// cancelled and the binding mounts again with the new parameters.
    pub async fn set_source(&mut self, collection: impl Into<String>, realtime: bool) {
        let collection = collection.into();
        if collection == self.collection && realtime == self.realtime {
            return;
        }
        self.unmount();
        self.collection = collection;
        self.realtime = realtime;
        self.mount().await;
    }

    // ── Operations ───────────────────────────────────────────────

    /// Re-run the one-shot fetch, whatever the mode.
    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Create a document through the API.
    ///
    /// In one-shot mode `{id, ...fields}` is appended to `data` right away,
    /// without re-fetching. Realtime mode leaves `data` to the next tick.
    /// On failure the error is stored in `error` and returned.
    pub async fn add_item(&self, fields: Fields) -> Result<String, CoreError> {
        match self.poller.source().create(&self.collection, &fields).await {
            Ok(id) => {
                if !self.realtime {
                    let doc = Document::new(id.clone(), fields);
                    self.state.send_modify(|s| Arc::make_mut(s).data.push(doc));
                }
                Ok(id)
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(collection = %self.collection, error = %err, "add item failed");
                let stored = err.clone();
                self.state
                    .send_modify(|s| Arc::make_mut(s).error = Some(stored));
                Err(err)
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────

    async fn load(&self) {
        self.state
            .send_modify(|s| Arc::make_mut(s).start_loading());

        match self.poller.source().list(&self.collection).await {
            Ok(docs) => self.state.send_modify(|s| {
                let s = Arc::make_mut(s);
                s.data = docs;
                s.error = None;
                s.loading = false;
                s.phase = Phase::Ready;
            }),
            Err(e) => {
                let err = CoreError::from(e);
                warn!(collection = %self.collection, error = %err, "fetch failed");
                self.state.send_modify(|s| {
                    let s = Arc::make_mut(s);
                    s.error = Some(err);
                    s.loading = false;
                    s.phase = Phase::Failed;
                });
            }
        }
    }

    fn start_polling(&mut self) {
        self.state
            .send_modify(|s| Arc::make_mut(s).start_loading());

        let state = Arc::clone(&self.state);
        let subscription = self.poller.subscribe(
            self.collection.clone(),
            move |docs| {
                state.send_modify(|s| {
                    let s = Arc::make_mut(s);
                    s.data = docs;
                    s.loading = false;
                    s.phase = Phase::Ready;
                });
            },
            self.interval,
        );
        self.subscription = Some(subscription);
    }
}

impl<S: CollectionSource> Drop for CollectionBinding<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
