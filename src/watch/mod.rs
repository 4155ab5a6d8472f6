//! Get/Watch protocol runtime
//!
//! Generated server regions delegate to [`handle_get`] and [`serve_watch`];
//! generated client regions wrap the response stream in a [`Watcher`].
//!
//! ```text
//! client                          server
//! Watcher ◀── stream ◀── serve_watch ── WatchSession ◀── ValueAccessor::watch
//!                                         │
//!                                         └── Endpoint::make (snapshot + changes)
//! ```

mod cache;
mod endpoint;
mod memory;
mod service;
mod session;
mod store;
mod unary;
mod watcher;

pub use cache::*;
pub use endpoint::*;
pub use memory::*;
pub use service::*;
pub use session::*;
pub use store::*;
pub use unary::*;
pub use watcher::*;
