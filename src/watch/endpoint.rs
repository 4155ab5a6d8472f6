use std::net::SocketAddr;

use tonic::metadata::MetadataMap;
use tonic::Status;
use tokio_util::sync::CancellationToken;

use super::ValueAccessor;
use crate::constants::DEFAULT_REPLY_BUFFER_SIZE;

/// Server-side behavior of one Get/Watch resource.
///
/// The generated service impl forwards both RPCs to [`crate::handle_get`] and
/// [`crate::serve_watch`], which drive these hooks.
pub trait Endpoint: Send + Sync + 'static {
    type Request: Send + Sync + 'static;
    type Reply: Send + 'static;
    type Store: ValueAccessor;

    /// Derives the store key for a request.
    fn get_key(
        &self,
        request: &Self::Request,
        ctx: &CallContext,
    ) -> Result<String, Status>;

    /// Builds the reply for a stored value. The flag is `false` when the reply
    /// carries nothing new for this key, in which case Watch skips it.
    fn make(
        &self,
        key: &str,
        value: <Self::Store as ValueAccessor>::Value,
    ) -> Result<(Self::Reply, bool), Status>;

    fn store(&self) -> &Self::Store;

    /// Used in log fields
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of the reply queue between a watch session and its stream
    fn reply_buffer(&self) -> usize {
        DEFAULT_REPLY_BUFFER_SIZE
    }
}

/// Per-call context handed to [`Endpoint::get_key`]
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    remote_addr: Option<SocketAddr>,
    metadata: MetadataMap,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        Self {
            remote_addr: request.remote_addr(),
            metadata: request.metadata().clone(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_remote_addr(
        mut self,
        addr: SocketAddr,
    ) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn with_metadata(
        mut self,
        metadata: MetadataMap,
    ) -> Self {
        self.metadata = metadata;
        self
    }

    /// Peer address reported by the transport.
    ///
    /// # Errors
    /// `Status::unavailable` when the transport did not provide one, e.g. for
    /// in-process calls.
    pub fn remote_addr(&self) -> Result<SocketAddr, Status> {
        self.remote_addr
            .ok_or_else(|| Status::unavailable("failed to get peer address"))
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Watch sessions run on a child of this token, so cancelling it stops
    /// them.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
