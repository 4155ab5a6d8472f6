//! Error hierarchy for the generator and the Get/Watch runtime
//!
//! Generator failures (configuration, templates, regions, file I/O) abort the
//! invocation. Runtime failures ([`WatchError`], [`StoreError`]) are scoped to
//! a single RPC call and are converted into a [`tonic::Status`] for the caller.

use std::path::PathBuf;

use config::ConfigError;
use tonic::Status;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Template rendering and region injection failures
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// Target file resolution, read and write failures
    #[error(transparent)]
    File(#[from] FileError),

    /// Get/Watch runtime failures
    #[error(transparent)]
    Watch(#[from] WatchError),
}

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A placeholder in the template had no binding, or the template is unknown
    #[error("Failed to render template `{template}`: {source}")]
    Template {
        template: &'static str,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// A built-in template failed to parse
    #[error("Failed to register template: {0}")]
    TemplateRegistration(#[from] Box<handlebars::TemplateError>),

    /// Resource name or key parameter is not a usable identifier
    #[error("Invalid resource descriptor: {0}")]
    InvalidDescriptor(String),

    /// Rendered text does not carry exactly one pair of tags for its key
    #[error("Rendered region is not tagged for `{key}`")]
    UntaggedRegion { key: String },

    /// Tag pattern could not be compiled
    #[error("Invalid region pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Existing text holds an ambiguous or unterminated region for the key
    #[error("Malformed region `{key}`: found {starts} start tag(s) and {ends} end tag(s)")]
    MalformedRegion {
        key: String,
        starts: usize,
        ends: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The environment variable naming the target file is unset or empty
    #[error("Target file path is not set, expected environment variable {var}")]
    MissingTargetPath { var: String },

    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Renaming the fully written temporary file over the target failed
    #[error("Failed to replace {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Backing store failures reported by a [`crate::ValueAccessor`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Store is closed")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The endpoint refused to resolve a key for the request
    #[error("Failed to resolve key: {0}")]
    Key(Status),

    #[error("Failed to read {key} from store: {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Fail to watch {key}, {source}")]
    Subscribe {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The store delivered its terminal error event kind
    #[error("got an error from store, Key: {key}, ID: {id}, Data: {data}")]
    StoreEvent { key: String, id: u64, data: String },

    /// The endpoint's `make` transform failed
    #[error("Failed to transform value: {0}")]
    Transform(Status),

    /// The outbound stream is gone
    #[error("Watch peer disconnected")]
    Disconnected,
}

impl From<StoreError> for Status {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::KeyNotFound(key) => Status::not_found(format!("key not found: {key}")),
            StoreError::Backend(msg) => Status::internal(msg),
            StoreError::Closed => Status::unavailable("store is closed"),
        }
    }
}

impl From<WatchError> for Status {
    fn from(e: WatchError) -> Self {
        match e {
            WatchError::Key(status) | WatchError::Transform(status) => status,
            WatchError::Store { source, .. } => source.into(),
            WatchError::Subscribe { .. } => Status::unavailable(e.to_string()),
            WatchError::StoreEvent { .. } => Status::internal(e.to_string()),
            WatchError::Disconnected => Status::cancelled(e.to_string()),
        }
    }
}
