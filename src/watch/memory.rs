//! In-process [`ValueAccessor`]
//!
//! Values live in a locked map, subscribers in a per-key [`DashMap`]. Every
//! mutation takes the next modification index and is pushed to the key's
//! subscribers without blocking. When a subscriber's queue is full the event
//! is parked in its backlog slot, where newer events replace older ones, and
//! a flush task delivers the slot once space frees up. A lagging subscriber
//! may skip intermediate values but always ends on the latest one. A parked
//! error is never replaced.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::EventKind;
use super::StoreEvent;
use super::ValueAccessor;
use crate::constants::DEFAULT_EVENT_BUFFER_SIZE;
use crate::StoreError;
use crate::WatchConfig;

struct Subscriber<V> {
    id: u64,
    tx: mpsc::Sender<StoreEvent<V>>,
    backlog: Arc<Mutex<Option<StoreEvent<V>>>>,
    runtime: Handle,
}

impl<V: Clone + Send + 'static> Subscriber<V> {
    /// `false` once the receiver is gone.
    fn offer(
        &self,
        event: &StoreEvent<V>,
    ) -> bool {
        let mut backlog = self.backlog.lock();
        if let Some(parked) = backlog.as_mut() {
            if !matches!(parked.kind, EventKind::Error(_)) {
                trace!(key = %event.key, id = event.id, subscriber = self.id, "Replaced backlogged event");
                *parked = event.clone();
            }
            return !self.tx.is_closed();
        }

        match self.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(key = %event.key, id = event.id, subscriber = self.id, "Subscriber queue full, event backlogged");
                *backlog = Some(event);
                self.runtime.spawn(flush(self.tx.clone(), self.backlog.clone()));
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Delivers the backlogged event once the queue has room.
async fn flush<V>(
    tx: mpsc::Sender<StoreEvent<V>>,
    backlog: Arc<Mutex<Option<StoreEvent<V>>>>,
) {
    let Ok(permit) = tx.reserve().await else {
        return;
    };
    if let Some(event) = backlog.lock().take() {
        trace!(key = %event.key, id = event.id, "Flushed backlogged event");
        permit.send(event);
    }
}

type Subscribers<V> = Arc<DashMap<String, Vec<Subscriber<V>>>>;

pub struct MemoryStore<V> {
    values: RwLock<HashMap<String, V>>,
    subscribers: Subscribers<V>,
    revision: AtomicU64,
    next_subscriber: AtomicU64,
    event_buffer_size: usize,
    closed: AtomicBool,
}

impl<V> Default for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(event_buffer_size: usize) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            subscribers: Arc::new(DashMap::new()),
            revision: AtomicU64::new(0),
            next_subscriber: AtomicU64::new(0),
            event_buffer_size: event_buffer_size.max(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.event_buffer_size)
    }

    /// Stores `value` and notifies subscribers. Returns the modification index.
    pub fn put(
        &self,
        key: &str,
        value: V,
    ) -> u64 {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.clone());
        self.publish(key, EventKind::Put(value))
    }

    /// Removes `key`; subscribers receive the empty value. Returns the
    /// modification index, or `None` when the key was absent.
    pub fn delete(
        &self,
        key: &str,
    ) -> Option<u64>
    where
        V: Default,
    {
        let mut values = self.values.write();
        values.remove(key)?;
        Some(self.publish(key, EventKind::Delete(V::default())))
    }

    /// Pushes a terminal error event to the subscribers of `key`.
    pub fn fail(
        &self,
        key: &str,
        data: impl Into<String>,
    ) -> u64 {
        let _values = self.values.read();
        self.publish(key, EventKind::Error(data.into()))
    }

    /// Ends every event stream open on `key`.
    pub fn close(
        &self,
        key: &str,
    ) {
        if let Some((_, subs)) = self.subscribers.remove(key) {
            debug!(%key, count = subs.len(), "Closed watch streams");
        }
    }

    /// Ends all event streams and refuses further reads and subscriptions.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.subscribers.clear();
        debug!("Memory store shut down");
    }

    pub fn subscriber_count(
        &self,
        key: &str,
    ) -> usize {
        self.subscribers.get(key).map(|subs| subs.len()).unwrap_or(0)
    }

    /// Latest modification index handed out
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn publish(
        &self,
        key: &str,
        kind: EventKind<V>,
    ) -> u64 {
        let id = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        let event = StoreEvent {
            id,
            key: key.to_string(),
            kind,
        };

        if let Some(mut subs) = self.subscribers.get_mut(key) {
            subs.retain(|sub| sub.offer(&event));
        }
        self.subscribers.remove_if(key, |_, subs| subs.is_empty());

        trace!(%key, id, "Published store event");
        id
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[tonic::async_trait]
impl<V> ValueAccessor for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Value = V;

    async fn get(
        &self,
        key: &str,
    ) -> Result<V, StoreError> {
        self.check_open()?;
        let value = self.values.read().get(key).cloned();
        value.ok_or_else(|| StoreError::KeyNotFound(key.to_string()))
    }

    async fn watch(
        &self,
        key: &str,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<StoreEvent<V>>, StoreError> {
        self.check_open()?;

        let (tx, rx) = mpsc::channel(self.event_buffer_size);
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .entry(key.to_string())
            .or_default()
            .push(Subscriber {
                id,
                tx,
                backlog: Arc::new(Mutex::new(None)),
                runtime: Handle::current(),
            });
        debug!(%key, subscriber = id, "Subscribed");

        let subscribers = self.subscribers.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            cancel.cancelled().await;
            if let Some(mut subs) = subscribers.get_mut(&key) {
                subs.retain(|sub| sub.id != id);
            }
            subscribers.remove_if(&key, |_, subs| subs.is_empty());
            debug!(%key, subscriber = id, "Unsubscribed");
        });

        Ok(rx)
    }
}
