// ── Snapshot streams ──
//
// Subscription handle for consuming a controller's published state.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::controller::CollectionSnapshot;

/// A subscription to one collection view.
///
/// Gives point-in-time access plus change notification via
/// [`changed`](Self::changed) or by converting into a `Stream`.
pub struct SnapshotStream<R: Send + Sync + 'static> {
    current: CollectionSnapshot<R>,
    receiver: watch::Receiver<CollectionSnapshot<R>>,
}

impl<R: Send + Sync + 'static> SnapshotStream<R> {
    pub(crate) fn new(receiver: watch::Receiver<CollectionSnapshot<R>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &CollectionSnapshot<R> {
        &self.current
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> CollectionSnapshot<R> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<CollectionSnapshot<R>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait until `pred` holds for the published snapshot.
    pub async fn wait_for(
        &mut self,
        mut pred: impl FnMut(&CollectionSnapshot<R>) -> bool,
    ) -> Option<CollectionSnapshot<R>> {
        let snap = self.receiver.wait_for(|s| pred(s)).await.ok()?.clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> SnapshotWatchStream<R> {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each published snapshot.
pub struct SnapshotWatchStream<R: Send + Sync + 'static> {
    inner: WatchStream<CollectionSnapshot<R>>,
}

impl<R: Send + Sync + 'static> Stream for SnapshotWatchStream<R> {
    type Item = CollectionSnapshot<R>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
