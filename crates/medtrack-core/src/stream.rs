// ── Reactive view streams ──
//
// Subscription types for consuming view-state changes from a binding.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::binding::ViewState;

/// A subscription to one binding's [`ViewState`].
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via [`changed()`](Self::changed) or by converting to a
/// `Stream`.
pub struct ViewStream {
    current: Arc<ViewState>,
    receiver: watch::Receiver<Arc<ViewState>>,
}

impl ViewStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<ViewState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<ViewState> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<ViewState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the binding has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<ViewState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Wait until `predicate` holds for the latest snapshot.
    /// Returns `None` if the binding is dropped first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&ViewState) -> bool,
    ) -> Option<Arc<ViewState>> {
        let snap = self
            .receiver
            .wait_for(|state| predicate(state))
            .await
            .ok()?
            .clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ViewWatchStream {
        ViewWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current state first, then a new snapshot each time the
/// binding changes it.
pub struct ViewWatchStream {
    inner: WatchStream<Arc<ViewState>>,
}

impl Stream for ViewWatchStream {
    type Item = Arc<ViewState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
