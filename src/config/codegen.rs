use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Settings consumed by the generator
///
/// The path settings are spliced verbatim into rendered code, so they must be
/// valid Rust paths in the crate that owns the target file.
///
/// # Example
/// ```toml
/// [codegen]
/// target_env = "GETWATCH_FILE"
/// proto_module = "crate::pb"
/// runtime_crate = "getwatch"
/// client_type = "Client"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CodegenConfig {
    /// Environment variable holding the path of the file to rewrite
    #[serde(default = "default_target_env")]
    pub target_env: String,

    /// Module exposing the tonic-generated messages and service modules
    #[serde(default = "default_proto_module")]
    pub proto_module: String,

    /// Path to this crate as seen from the target file
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,

    /// Hand-written client type the generated accessors are attached to
    #[serde(default = "default_client_type")]
    pub client_type: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            target_env: default_target_env(),
            proto_module: default_proto_module(),
            runtime_crate: default_runtime_crate(),
            client_type: default_client_type(),
        }
    }
}

impl CodegenConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_env.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "codegen.target_env cannot be empty".into(),
            )));
        }

        for (field, value) in [
            ("proto_module", &self.proto_module),
            ("runtime_crate", &self.runtime_crate),
            ("client_type", &self.client_type),
        ] {
            if !is_rust_path(value) {
                return Err(Error::Config(ConfigError::Message(format!(
                    "codegen.{field} must be a Rust path, got {value:?}"
                ))));
            }
        }
        Ok(())
    }
}

/// `a::b::C` style paths; each segment an identifier
fn is_rust_path(value: &str) -> bool {
    !value.is_empty()
        && value.split("::").all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn default_target_env() -> String {
    "GETWATCH_FILE".to_string()
}
fn default_proto_module() -> String {
    "pb".to_string()
}
fn default_runtime_crate() -> String {
    "getwatch".to_string()
}
fn default_client_type() -> String {
    "Client".to_string()
}
