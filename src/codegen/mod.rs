//! Get/Watch region generator
//!
//! Renders the client or server access pattern for one resource and injects it
//! into a target source file:
//!
//! ```text
//! ResourceDescriptor ─▶ render_client / render_server ─▶ inject ─▶ write_atomically
//! ```
//!
//! Re-running the generator for the same resource replaces its region in
//! place, so generated code can live next to hand-written code.
//!
//! # Example
//! ```no_run
//! use getwatch::{generate_client, CodegenConfig, ResourceDescriptor};
//! use std::path::Path;
//!
//! let pod = ResourceDescriptor::new("Pod", Some("id")).unwrap();
//! generate_client(Path::new("src/client.rs"), &pod, &CodegenConfig::default()).unwrap();
//! ```

mod client;
mod region;
mod server;
mod template;

pub use client::*;
pub use region::*;
pub use server::*;
pub use template::*;


use std::env;
use std::path::Path;
use std::path::PathBuf;

use heck::ToSnakeCase;
use tracing::info;

use crate::file_io;
use crate::CodegenConfig;
use crate::CodegenError;
use crate::FileError;
use crate::Result;

/// A resource exposed over Get/Watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    name: String,
    key_param: Option<String>,
}

impl ResourceDescriptor {
    /// # Errors
    /// [`CodegenError::InvalidDescriptor`] when `name` is not an identifier
    /// starting with an uppercase letter, or `key_param` is not an identifier.
    pub fn new(
        name: impl Into<String>,
        key_param: Option<&str>,
    ) -> Result<Self> {
        let name = name.into();
        if !is_identifier(&name) || !name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(CodegenError::InvalidDescriptor(format!(
                "resource name {name:?} must be an identifier starting with an uppercase letter"
            ))
            .into());
        }
        if let Some(key) = key_param {
            if !is_identifier(key) || key.to_snake_case().is_empty() {
                return Err(CodegenError::InvalidDescriptor(format!(
                    "key parameter {key:?} must be an identifier"
                ))
                .into());
            }
        }
        Ok(Self {
            name,
            key_param: key_param.map(str::to_string),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for singleton resources
    pub fn key_param(&self) -> Option<&str> {
        self.key_param.as_deref()
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Field name prost generates for message field `key`: snake_case, keywords
/// as raw identifiers, and a trailing `_` for the ones that cannot be raw.
pub(crate) fn field_ident(key: &str) -> String {
    let field = key.to_snake_case();
    match field.as_str() {
        "self" | "super" | "extern" | "crate" => format!("{field}_"),
        "as" | "async" | "await" | "break" | "const" | "continue" | "dyn" | "else" | "enum"
        | "false" | "fn" | "for" | "if" | "impl" | "in" | "let" | "loop" | "match" | "mod"
        | "move" | "mut" | "pub" | "ref" | "return" | "static" | "struct" | "trait" | "true"
        | "type" | "unsafe" | "use" | "where" | "while" | "abstract" | "become" | "box" | "do"
        | "final" | "gen" | "macro" | "override" | "priv" | "try" | "typeof" | "unsized"
        | "virtual" | "yield" => format!("r#{field}"),
        _ => field,
    }
}

/// Resolves the target file from the environment variable `var`.
///
/// Only the CLI calls this; library callers pass paths explicitly.
pub fn target_path_from_env(var: &str) -> Result<PathBuf> {
    match env::var_os(var) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(FileError::MissingTargetPath { var: var.to_string() }.into()),
    }
}

/// Generates or refreshes the client region for `descriptor` in `path`.
pub fn generate_client(
    path: &Path,
    descriptor: &ResourceDescriptor,
    config: &CodegenConfig,
) -> Result<()> {
    let renderer = TemplateRenderer::new()?;
    let rendered = render_client(&renderer, descriptor, config)?;
    rewrite(path, &client_region_key(descriptor), &rendered)?;
    info!(path = %path.display(), name = %descriptor.name(), "Generated client region");
    Ok(())
}

/// Generates or refreshes server region `index` for `descriptor` in `path`.
pub fn generate_server(
    path: &Path,
    index: u32,
    descriptor: &ResourceDescriptor,
    config: &CodegenConfig,
) -> Result<()> {
    let renderer = TemplateRenderer::new()?;
    let rendered = render_server(&renderer, index, descriptor, config)?;
    rewrite(path, &server_region_key(index), &rendered)?;
    info!(path = %path.display(), index, name = %descriptor.name(), "Generated server region");
    Ok(())
}

/// Read, inject, write back. Every fallible step before the final rename
/// leaves `path` untouched.
fn rewrite(
    path: &Path,
    key: &RegionKey,
    rendered: &str,
) -> Result<()> {
    let existing = file_io::read_to_string(path)?;
    let updated = inject(&existing, key, rendered)?;
    if updated == existing {
        info!(path = %path.display(), %key, "Region already up to date");
        return Ok(());
    }
    file_io::write_atomically(path, &updated)
}
