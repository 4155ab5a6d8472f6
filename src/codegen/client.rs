//! Client-side Get/Watch accessors
//!
//! The rendered region attaches two async accessors to the hand-written
//! client type and declares the resource's watcher alias. The client type is
//! expected to carry:
//!
//! - `timeout: std::time::Duration` applied to every unary Get
//! - `cancel: tokio_util::sync::CancellationToken` parenting every watcher
//! - `<resource>_client: pb::<resource>_client::<Name>Client<Channel>`

use heck::ToSnakeCase;
use tracing::debug;

use super::template::Bindings;
use super::template::TemplateRenderer;
use super::field_ident;
use super::RegionKey;
use super::ResourceDescriptor;
use crate::constants::CLIENT_TEMPLATE_NAME;
use crate::CodegenConfig;
use crate::Result;

pub(crate) const CLIENT_TEMPLATE: &str = r#"
// CODE GENERATION {{name}} START
impl {{client_type}} {
    /// Fetches the current `{{name}}` value.
    pub async fn {{snake}}_get(&self{{param_str}}) -> Result<{{pb}}::{{name}}Reply, tonic::Status> {
        let request = {{pb}}::{{name}}Request {{req_init}};
        let mut client = self.{{snake}}_client.clone();
        {{rt}}::call_with_timeout(self.timeout, client.get(request)).await
    }

    /// Opens a long-lived watch on `{{name}}`.
    pub async fn {{snake}}_watch(&self{{param_str}}) -> Result<{{name}}Watcher, tonic::Status> {
        let request = {{pb}}::{{name}}Request {{req_init}};
        let mut client = self.{{snake}}_client.clone();
        let stream = client.watch(request).await?.into_inner();
        Ok({{rt}}::Watcher::spawn(stream, self.cancel.child_token()))
    }
}

pub type {{name}}Watcher = {{rt}}::Watcher<{{pb}}::{{name}}Reply>;
// CODE GENERATION {{name}} END
"#;

/// Renders the client region for `descriptor`.
pub fn render_client(
    renderer: &TemplateRenderer,
    descriptor: &ResourceDescriptor,
    config: &CodegenConfig,
) -> Result<String> {
    let bindings = client_bindings(descriptor, config);
    debug!(name = %descriptor.name(), key = ?descriptor.key_param(), "Rendering client region");
    renderer.render(CLIENT_TEMPLATE_NAME, &bindings)
}

/// Region key owning a client region
pub fn client_region_key(descriptor: &ResourceDescriptor) -> RegionKey {
    RegionKey::Name(descriptor.name().to_string())
}

fn client_bindings(
    descriptor: &ResourceDescriptor,
    config: &CodegenConfig,
) -> Bindings {
    let (param_str, req_init) = match descriptor.key_param() {
        Some(key) => {
            let field = field_ident(key);
            (format!(", {field}: String"), format!("{{ {field} }}"))
        }
        None => (String::new(), "{}".to_string()),
    };

    let mut bindings = Bindings::new();
    bindings.insert("name", descriptor.name().to_string());
    bindings.insert("snake", descriptor.name().to_snake_case());
    bindings.insert("param_str", param_str);
    bindings.insert("req_init", req_init);
    bindings.insert("pb", config.proto_module.clone());
    bindings.insert("rt", config.runtime_crate.clone());
    bindings.insert("client_type", config.client_type.clone());
    bindings
}
