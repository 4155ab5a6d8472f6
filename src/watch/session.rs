//! Server side of one Watch call
//!
//! ```text
//! Init ─▶ SendSnapshot ─▶ Streaming ─┬─▶ Done    (cancelled, or store ended the stream)
//!   │          │              │      │
//!   └──────────┴──────────────┴──────┴─▶ Failed  (key, store, make or send error)
//! ```
//!
//! The snapshot is always sent. While streaming, replies whose `make` reports
//! no change are dropped.

use tokio::select;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;
use tonic::Status;

use super::CallContext;
use super::Endpoint;
use super::EventKind;
use super::StoreEvent;
use super::ValueAccessor;
use crate::WatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Init,
    SendSnapshot,
    Streaming,
    Done,
    Failed,
}

impl WatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WatchState::Done | WatchState::Failed)
    }
}

pub struct WatchSession<E: Endpoint> {
    endpoint: E,
    key: String,
    tx: mpsc::Sender<Result<E::Reply, Status>>,
    cancel: CancellationToken,
    state: WatchState,
}

impl<E: Endpoint> WatchSession<E> {
    /// Resolves the key for `request`. A failure here ends the call before
    /// any stream is handed out.
    pub fn init(
        endpoint: E,
        request: &E::Request,
        ctx: &CallContext,
        tx: mpsc::Sender<Result<E::Reply, Status>>,
    ) -> Result<Self, WatchError> {
        let key = endpoint.get_key(request, ctx).map_err(|status| {
            warn!(endpoint = endpoint.name(), ?status, "Failed to resolve watch key");
            WatchError::Key(status)
        })?;
        debug!(endpoint = endpoint.name(), %key, "Watch session created");

        Ok(Self {
            endpoint,
            key,
            tx,
            cancel: ctx.cancel_token().child_token(),
            state: WatchState::Init,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Token scoping this session and its store subscription
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drives the session to `Done` or `Failed`. The session's token is
    /// cancelled on return, which releases the store subscription.
    pub async fn run(&mut self) -> Result<(), WatchError> {
        let _guard = self.cancel.clone().drop_guard();

        let result = self.stream().await;
        self.state = match &result {
            Ok(()) => WatchState::Done,
            Err(e) => {
                warn!(endpoint = self.endpoint.name(), key = %self.key, "Watch session failed: {}", e);
                WatchState::Failed
            }
        };
        debug!(endpoint = self.endpoint.name(), key = %self.key, state = ?self.state, "Watch session finished");
        result
    }

    async fn stream(&mut self) -> Result<(), WatchError> {
        self.state = WatchState::SendSnapshot;
        let value = select! {
            _ = self.cancel.cancelled() => {
                debug!(key = %self.key, "Watch cancelled before snapshot");
                return Ok(());
            }
            value = self.endpoint.store().get(&self.key) => value.map_err(|source| WatchError::Store {
                key: self.key.clone(),
                source,
            })?,
        };
        let (reply, _) = self.endpoint.make(&self.key, value).map_err(WatchError::Transform)?;
        if !self.send(reply).await? {
            debug!(key = %self.key, "Watch cancelled while sending snapshot");
            return Ok(());
        }
        trace!(key = %self.key, "Snapshot sent");

        self.state = WatchState::Streaming;
        let mut events = self
            .endpoint
            .store()
            .watch(&self.key, self.cancel.clone())
            .await
            .map_err(|source| WatchError::Subscribe {
                key: self.key.clone(),
                source,
            })?;

        loop {
            select! {
                _ = self.cancel.cancelled() => {
                    debug!(key = %self.key, "Watch cancelled");
                    return Ok(());
                }
                event = events.recv() => match event {
                    None => {
                        debug!(key = %self.key, "Store closed the event stream");
                        return Ok(());
                    }
                    Some(event) => {
                        if !self.on_event(event).await? {
                            debug!(key = %self.key, "Watch cancelled while sending");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// `Ok(false)` when the session was cancelled while the reply waited
    /// for queue space.
    async fn on_event(
        &self,
        event: StoreEvent<<E::Store as ValueAccessor>::Value>,
    ) -> Result<bool, WatchError> {
        let value = match event.kind {
            EventKind::Put(value) | EventKind::Delete(value) => value,
            EventKind::Error(data) => {
                return Err(WatchError::StoreEvent {
                    key: self.key.clone(),
                    id: event.id,
                    data,
                });
            }
        };

        let (reply, changed) = self.endpoint.make(&self.key, value).map_err(WatchError::Transform)?;
        if !changed {
            trace!(key = %self.key, id = event.id, "Reply unchanged, skipped");
            return Ok(true);
        }
        if !self.send(reply).await? {
            return Ok(false);
        }
        trace!(key = %self.key, id = event.id, "Change sent");
        Ok(true)
    }

    /// Waits for queue space unless the session is cancelled first, in which
    /// case the reply is discarded and `Ok(false)` is returned.
    async fn send(
        &self,
        reply: E::Reply,
    ) -> Result<bool, WatchError> {
        select! {
            _ = self.cancel.cancelled() => Ok(false),
            permit = self.tx.reserve() => {
                permit.map_err(|_| WatchError::Disconnected)?.send(Ok(reply));
                Ok(true)
            }
        }
    }
}
