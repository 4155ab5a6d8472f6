//! Backing store abstraction

#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::StoreError;

/// What happened to a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind<V> {
    Put(V),
    /// Carries the store's empty value for the key
    Delete(V),
    /// Terminal store-internal failure
    Error(String),
}

/// One change notification for a watched key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent<V> {
    /// Store modification index
    pub id: u64,
    pub key: String,
    pub kind: EventKind<V>,
}

/// Read and subscribe access to a key/value store.
///
/// `watch` returns a receiver of change events for one key. The store must
/// release the subscription once `cancel` fires, and closes the receiver when
/// it has nothing more to deliver.
#[cfg_attr(test, automock(type Value = String;))]
#[tonic::async_trait]
pub trait ValueAccessor: Send + Sync + 'static {
    type Value: Send + 'static;

    async fn get(
        &self,
        key: &str,
    ) -> Result<Self::Value, StoreError>;

    async fn watch(
        &self,
        key: &str,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<StoreEvent<Self::Value>>, StoreError>;
}
