use std::pin::Pin;

use tokio::select;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::Status;
use tracing::debug;
use tracing::warn;

use super::CallContext;
use super::Endpoint;
use super::ValueAccessor;
use super::WatchSession;
use crate::WatchError;

/// Response stream of a Watch RPC
pub type WatchStream<R> = Pin<Box<dyn Stream<Item = Result<R, Status>> + Send + 'static>>;

/// Unary Get: resolve the key, read the store, build the reply.
pub async fn handle_get<E: Endpoint>(
    endpoint: &E,
    request: &E::Request,
    ctx: &CallContext,
) -> Result<E::Reply, Status> {
    let key = endpoint.get_key(request, ctx).map_err(WatchError::Key)?;
    debug!(endpoint = endpoint.name(), %key, "Get");

    let value = endpoint
        .store()
        .get(&key)
        .await
        .map_err(|source| WatchError::Store { key: key.clone(), source })?;

    let (reply, _) = endpoint.make(&key, value).map_err(|status| {
        warn!(endpoint = endpoint.name(), %key, ?status, "Failed to build reply");
        WatchError::Transform(status)
    })?;
    Ok(reply)
}

/// Starts a Watch session for `request` and returns its response stream.
///
/// Key resolution fails the call itself. Later failures arrive as the last
/// item of the stream. Dropping the stream cancels the session.
pub async fn serve_watch<E: Endpoint>(
    endpoint: E,
    request: E::Request,
    ctx: CallContext,
) -> Result<WatchStream<E::Reply>, Status> {
    let (tx, rx) = mpsc::channel(endpoint.reply_buffer().max(1));
    let mut session = WatchSession::init(endpoint, &request, &ctx, tx.clone())?;

    let token = session.cancel_token().clone();
    let monitor_tx = tx.clone();
    tokio::spawn(async move {
        select! {
            _ = monitor_tx.closed() => {
                debug!("Watch peer went away, cancelling session");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });

    tokio::spawn(async move {
        if let Err(e) = session.run().await {
            // peer is already gone when the session failed to send
            if !matches!(e, WatchError::Disconnected) {
                let _ = tx.send(Err(e.into())).await;
            }
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}
