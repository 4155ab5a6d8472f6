use std::time::Duration;

use futures::StreamExt;
use tokio::time::timeout;
use tonic::Status;

use crate::WatchStream;

/// Upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(2);

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Next stream item, failing the test if none shows up within [`WAIT`].
pub async fn next_item<R>(stream: &mut WatchStream<R>) -> Option<Result<R, Status>> {
    timeout(WAIT, stream.next()).await.expect("stream stalled")
}

/// Asserts that nothing is delivered for a short while.
pub async fn assert_quiet<R: std::fmt::Debug>(stream: &mut WatchStream<R>) {
    if let Ok(item) = timeout(Duration::from_millis(100), stream.next()).await {
        panic!("unexpected stream item: {item:?}");
    }
}
