use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use getwatch::CallContext;
use getwatch::ChangeCache;
use getwatch::Endpoint;
use getwatch::MemoryStore;
use getwatch::WatchConfig;
use tempfile::TempDir;
use tonic::Status;

/// Hand-written part of a client file the generator extends
pub const CLIENT_PRELUDE: &str = "\
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub struct Client {
    timeout: Duration,
    cancel: CancellationToken,
}
";

/// Hand-written part of a server file the generator extends
pub const SERVER_PRELUDE: &str = "\
#[derive(Clone)]
pub struct ConfigEndpoint;
";

/// A target file inside a fresh temporary directory
pub fn target_file(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target.rs");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRequest {
    pub target: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigReply {
    pub target: String,
    pub data: String,
}

/// Config resource keyed by target name
pub struct ConfigEndpoint {
    pub store: Arc<MemoryStore<String>>,
    cache: ChangeCache<ConfigReply>,
    reply_buffer: usize,
}

impl Clone for ConfigEndpoint {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: ChangeCache::new(),
            reply_buffer: self.reply_buffer,
        }
    }
}

impl ConfigEndpoint {
    pub fn new(store: Arc<MemoryStore<String>>) -> Self {
        Self {
            store,
            cache: ChangeCache::new(),
            reply_buffer: WatchConfig::default().reply_buffer_size,
        }
    }
}

impl Endpoint for ConfigEndpoint {
    type Request = ConfigRequest;
    type Reply = ConfigReply;
    type Store = MemoryStore<String>;

    fn get_key(
        &self,
        request: &ConfigRequest,
        _ctx: &CallContext,
    ) -> Result<String, Status> {
        if request.target.is_empty() {
            return Err(Status::invalid_argument("target is required"));
        }
        Ok(format!("/config/{}", request.target))
    }

    fn make(
        &self,
        key: &str,
        value: String,
    ) -> Result<(ConfigReply, bool), Status> {
        let reply = ConfigReply {
            target: key.trim_start_matches("/config/").to_string(),
            data: value,
        };
        let changed = self.cache.observe(key, &reply);
        Ok((reply, changed))
    }

    fn store(&self) -> &MemoryStore<String> {
        &self.store
    }

    fn reply_buffer(&self) -> usize {
        self.reply_buffer
    }
}
