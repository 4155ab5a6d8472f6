//! # getwatch
//!
//! Generates the Get/Watch access pattern for gRPC resources and ships the
//! runtime the generated code delegates to.
//!
//! - [`generate_client`] and [`generate_server`] render a resource's client
//!   accessors or server handlers and inject them into a tagged region of an
//!   existing source file. Re-running replaces the region in place.
//! - [`handle_get`], [`serve_watch`] and [`Watcher`] implement the Watch
//!   protocol once: a snapshot first, then only the changes an [`Endpoint`]
//!   reports, until cancellation, a store error, or the end of the store's
//!   event stream.

mod codegen;
mod config;
pub mod constants;
mod errors;
pub mod utils;
mod watch;

pub use codegen::*;
pub use config::*;
pub use errors::*;
pub use utils::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
