use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_WATCH_QUEUE_SIZE;
use crate::Error;
use crate::Result;

/// Client-side runtime parameters
///
/// Hand-written clients read `request_timeout()` into the `timeout` field the
/// generated unary accessors use. Watch calls are long-lived and carry no
/// timeout.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    /// Maximum time to wait for a unary Get reply
    /// Default: 3 seconds
    #[serde(default = "default_request_timeout_in_ms")]
    pub request_timeout_in_ms: u64,

    /// Replies buffered between a watcher's receive task and `next()`
    /// Default: 1
    #[serde(default = "default_watch_queue_size")]
    pub watch_queue_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_in_ms: default_request_timeout_in_ms(),
            watch_queue_size: default_watch_queue_size(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_in_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "client.request_timeout_in_ms must be at least 1ms".into(),
            )));
        }
        if self.watch_queue_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "client.watch_queue_size must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_request_timeout_in_ms() -> u64 {
    3000
}
fn default_watch_queue_size() -> usize {
    DEFAULT_WATCH_QUEUE_SIZE
}
