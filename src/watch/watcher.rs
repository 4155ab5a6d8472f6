//! Client handle over a Watch response stream
//!
//! A background task pulls replies off the stream into a small bounded queue.
//! The queue is the only handoff between the task and the consumer besides
//! the last error, which sits behind a lock.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::Stream;
use futures::StreamExt;
use parking_lot::RwLock;
use tokio::select;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::sync::DropGuard;
use tonic::Status;
use tracing::debug;
use tracing::warn;

use crate::constants::DEFAULT_WATCH_QUEUE_SIZE;
use crate::ClientConfig;

pub struct Watcher<R> {
    rx: mpsc::Receiver<R>,
    error: Arc<RwLock<Option<Status>>>,
    finished: Arc<AtomicBool>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl<R: Send + 'static> Watcher<R> {
    /// Starts receiving from `stream` until it ends, fails, or `cancel` fires.
    pub fn spawn<S>(
        stream: S,
        cancel: CancellationToken,
    ) -> Self
    where
        S: Stream<Item = Result<R, Status>> + Send + 'static,
    {
        Self::with_capacity(stream, cancel, DEFAULT_WATCH_QUEUE_SIZE)
    }

    pub fn with_config<S>(
        stream: S,
        cancel: CancellationToken,
        config: &ClientConfig,
    ) -> Self
    where
        S: Stream<Item = Result<R, Status>> + Send + 'static,
    {
        Self::with_capacity(stream, cancel, config.watch_queue_size)
    }

    pub fn with_capacity<S>(
        stream: S,
        cancel: CancellationToken,
        capacity: usize,
    ) -> Self
    where
        S: Stream<Item = Result<R, Status>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let error = Arc::new(RwLock::new(None));
        let finished = Arc::new(AtomicBool::new(false));

        tokio::spawn(receive(
            Box::pin(stream),
            tx,
            error.clone(),
            finished.clone(),
            cancel.clone(),
        ));

        Self {
            rx,
            error,
            finished,
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    /// Next reply, in stream order.
    ///
    /// Returns `Ok(None)` once the stream has ended cleanly or the watcher
    /// was cancelled, and the stream's error once every reply received
    /// before it has been consumed.
    pub async fn next(&mut self) -> Result<Option<R>, Status> {
        match self.rx.recv().await {
            Some(reply) => Ok(Some(reply)),
            None => match self.error.read().clone() {
                Some(status) => Err(status),
                None => Ok(None),
            },
        }
    }

    /// The error that ended the stream, if any
    pub fn last_error(&self) -> Option<Status> {
        self.error.read().clone()
    }

    /// Stops the background task. Replies already queued stay readable.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the background task has stopped receiving
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.finished.load(Ordering::Acquire)
    }
}

async fn receive<R, S>(
    mut stream: S,
    tx: mpsc::Sender<R>,
    error: Arc<RwLock<Option<Status>>>,
    finished: Arc<AtomicBool>,
    cancel: CancellationToken,
) where
    S: Stream<Item = Result<R, Status>> + Unpin,
{
    loop {
        let item = select! {
            _ = cancel.cancelled() => {
                debug!("Watcher cancelled");
                break;
            }
            item = stream.next() => item,
        };

        match item {
            Some(Ok(reply)) => {
                select! {
                    _ = cancel.cancelled() => {
                        debug!("Watcher cancelled while queueing");
                        break;
                    }
                    sent = tx.send(reply) => {
                        if sent.is_err() {
                            debug!("Watcher handle dropped");
                            break;
                        }
                    }
                }
            }
            Some(Err(status)) => {
                warn!(?status, "Watch stream failed");
                *error.write() = Some(status);
                break;
            }
            None => {
                debug!("Watch stream ended");
                break;
            }
        }
    }
    finished.store(true, Ordering::Release);
}
