//! Result handles for submitted tasks.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use super::error::{PoolError, PoolResult};

/// Outcome sent from a worker back to the submitter.
pub(crate) type TaskOutcome<R> = PoolResult<R>;

/// Handle to the eventual result of a submitted task.
///
/// The result can be retrieved once, either by blocking with [`get`], by
/// polling with [`try_get`], or by awaiting the handle itself. If the task is
/// dropped without running, the handle resolves to [`PoolError::Cancelled`].
///
/// [`get`]: TaskHandle::get
/// [`try_get`]: TaskHandle::try_get
#[derive(Debug)]
pub struct TaskHandle<R> {
    rx: oneshot::Receiver<TaskOutcome<R>>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn new(rx: oneshot::Receiver<TaskOutcome<R>>) -> Self {
        Self { rx }
    }

    /// Block the current thread until the task has finished.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async runtime; await the handle
    /// there instead.
    pub fn get(self) -> PoolResult<R> {
        self.rx.blocking_recv().unwrap_or(Err(PoolError::Cancelled))
    }

    /// Return the result if the task has already finished.
    ///
    /// `None` means the task is still queued or running. Once this returns
    /// `Some`, the result has been consumed and later calls report
    /// [`PoolError::Cancelled`].
    pub fn try_get(&mut self) -> Option<PoolResult<R>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(PoolError::Cancelled)),
        }
    }

    /// Await the result, giving up after `timeout`.
    ///
    /// Giving up does not stop the task; it keeps running on its worker and
    /// its result is discarded.
    pub async fn get_timeout(self, timeout: Duration) -> PoolResult<R> {
        match tokio::time::timeout(timeout, self).await {
            Ok(outcome) => outcome,
            Err(_) => Err(PoolError::Timeout(timeout)),
        }
    }
}

impl<R> Future for TaskHandle<R> {
    type Output = PoolResult<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(PoolError::Cancelled)))
    }
}
