use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tonic::Status;
use tracing::debug;
use tracing::warn;

/// Awaits a unary RPC for at most `timeout_duration`.
///
/// The substrate's status is returned unchanged; running out of time is
/// `Status::deadline_exceeded`. No retries.
pub async fn call_with_timeout<R, F>(
    timeout_duration: Duration,
    call: F,
) -> Result<R, Status>
where
    F: Future<Output = Result<tonic::Response<R>, Status>>,
{
    match timeout(timeout_duration, call).await {
        Ok(Ok(response)) => Ok(response.into_inner()),
        Ok(Err(status)) => {
            debug!(?status, "Unary call failed");
            Err(status)
        }
        Err(_) => {
            warn!("Unary call timed out after {:?}", timeout_duration);
            Err(Status::deadline_exceeded("RPC timeout exceeded"))
        }
    }
}
