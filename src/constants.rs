// -
// Region tags

/// Leading text of every region tag line, followed by the key and START/END
pub(crate) const REGION_TAG_PREFIX: &str = "// CODE GENERATION";

// -
// Template names

pub(crate) const CLIENT_TEMPLATE_NAME: &str = "client";
pub(crate) const SERVER_TEMPLATE_NAME: &str = "server";

// -
// Runtime defaults

/// Replies queued between a watcher's background receiver and its consumer
pub const DEFAULT_WATCH_QUEUE_SIZE: usize = 1;

/// Replies queued on a served Watch stream before the session blocks
pub const DEFAULT_REPLY_BUFFER_SIZE: usize = 1;

/// Events buffered per store subscriber
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 16;
