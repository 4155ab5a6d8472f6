//! Server-side Get/Watch handlers
//!
//! The rendered region implements the tonic service trait of one resource for
//! `<Name>Endpoint` by delegating to [`crate::handle_get`] and
//! [`crate::serve_watch`]. The endpoint type must implement
//! [`crate::Endpoint`] and `Clone`.

use heck::ToSnakeCase;
use tracing::debug;

use super::template::Bindings;
use super::template::TemplateRenderer;
use super::RegionKey;
use super::ResourceDescriptor;
use crate::constants::SERVER_TEMPLATE_NAME;
use crate::CodegenConfig;
use crate::Result;

pub(crate) const SERVER_TEMPLATE: &str = r#"
// CODE GENERATION {{index}} START
#[tonic::async_trait]
impl {{pb}}::{{snake}}_server::{{name}} for {{name}}Endpoint {
    type WatchStream = {{rt}}::WatchStream<{{pb}}::{{name}}Reply>;

    async fn get(
        &self,
        request: tonic::Request<{{pb}}::{{name}}Request>,
    ) -> Result<tonic::Response<{{pb}}::{{name}}Reply>, tonic::Status> {
        let ctx = {{rt}}::CallContext::from_request(&request);
        let reply = {{rt}}::handle_get(self, request.get_ref(), &ctx).await?;
        Ok(tonic::Response::new(reply))
    }

    async fn watch(
        &self,
        request: tonic::Request<{{pb}}::{{name}}Request>,
    ) -> Result<tonic::Response<Self::WatchStream>, tonic::Status> {
        let ctx = {{rt}}::CallContext::from_request(&request);
        let stream = {{rt}}::serve_watch(self.clone(), request.into_inner(), ctx).await?;
        Ok(tonic::Response::new(stream))
    }
}
// CODE GENERATION {{index}} END
"#;

/// Renders the server region numbered `index` for resource `name`.
pub fn render_server(
    renderer: &TemplateRenderer,
    index: u32,
    descriptor: &ResourceDescriptor,
    config: &CodegenConfig,
) -> Result<String> {
    debug!(index, name = %descriptor.name(), "Rendering server region");

    let mut bindings = Bindings::new();
    bindings.insert("index", index.to_string());
    bindings.insert("name", descriptor.name().to_string());
    bindings.insert("snake", descriptor.name().to_snake_case());
    bindings.insert("pb", config.proto_module.clone());
    bindings.insert("rt", config.runtime_crate.clone());

    renderer.render(SERVER_TEMPLATE_NAME, &bindings)
}

/// Region key owning a server region
pub fn server_region_key(index: u32) -> RegionKey {
    RegionKey::Index(index)
}
