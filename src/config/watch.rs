use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_EVENT_BUFFER_SIZE;
use crate::constants::DEFAULT_REPLY_BUFFER_SIZE;
use crate::Error;
use crate::Result;

/// Server-side Watch runtime parameters
///
/// # Example
/// ```toml
/// [watch]
/// event_buffer_size = 16
/// reply_buffer_size = 1
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Buffer size of each store subscriber's event channel
    ///
    /// When a subscriber's buffer is full, [`crate::MemoryStore`] drops the
    /// event for that subscriber and logs a warning.
    ///
    /// **Default**: 16
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,

    /// Replies queued on an outbound Watch stream before the session waits
    /// for the transport to drain it
    ///
    /// **Default**: 1
    #[serde(default = "default_reply_buffer_size")]
    pub reply_buffer_size: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer_size(),
            reply_buffer_size: default_reply_buffer_size(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.event_buffer_size must be greater than 0".into(),
            )));
        }
        if self.reply_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.reply_buffer_size must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}
fn default_reply_buffer_size() -> usize {
    DEFAULT_REPLY_BUFFER_SIZE
}
