// ── Coordinator status streams ──
//
// Subscription handle for consumers that follow the coordinator's
// publications, either by awaiting `changed()` or as a `Stream`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::coordinator::CoordinatorStatus;

/// A subscription to coordinator publications.
///
/// Provides both point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct StatusStream {
    current: CoordinatorStatus,
    receiver: watch::Receiver<CoordinatorStatus>,
}

impl StatusStream {
    pub(crate) fn new(mut receiver: watch::Receiver<CoordinatorStatus>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The status captured at creation time or by the last `changed()`.
    pub fn current(&self) -> &CoordinatorStatus {
        &self.current
    }

    /// The latest published status (may be newer than `current()`).
    pub fn latest(&self) -> CoordinatorStatus {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<CoordinatorStatus> {
        self.receiver.changed().await.ok()?;
        let status = self.receiver.borrow_and_update().clone();
        self.current = status.clone();
        Some(status)
    }

    /// Convert into a `Stream` yielding every publication after the one
    /// returned by `current()`.
    pub fn into_stream(self) -> StatusWatchStream {
        StatusWatchStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StatusWatchStream {
    inner: WatchStream<CoordinatorStatus>,
}

impl Stream for StatusWatchStream {
    type Item = CoordinatorStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
