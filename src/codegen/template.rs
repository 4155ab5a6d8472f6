//! Strict template rendering
//!
//! Templates use `{{binding}}` placeholders. Rendering runs in strict mode: a
//! placeholder without a binding fails the whole render, so a half-filled
//! region can never reach the target file. Escaping is disabled because the
//! output is source code, not HTML.

use std::collections::BTreeMap;

use handlebars::Handlebars;

use super::client::CLIENT_TEMPLATE;
use super::server::SERVER_TEMPLATE;
use crate::constants::CLIENT_TEMPLATE_NAME;
use crate::constants::SERVER_TEMPLATE_NAME;
use crate::CodegenError;
use crate::Result;

/// Named placeholder values for one render
pub type Bindings = BTreeMap<&'static str, String>;

pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Renderer with the built-in client and server templates registered
    pub fn new() -> Result<Self> {
        Self::with_templates(&[
            (CLIENT_TEMPLATE_NAME, CLIENT_TEMPLATE),
            (SERVER_TEMPLATE_NAME, SERVER_TEMPLATE),
        ])
    }

    pub fn with_templates(templates: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in templates {
            registry
                .register_template_string(name, *template)
                .map_err(|e| CodegenError::TemplateRegistration(Box::new(e)))?;
        }
        Ok(Self { registry })
    }

    /// Renders `template` with `bindings`.
    ///
    /// # Errors
    /// [`CodegenError::Template`] when the template is unknown or references a
    /// placeholder missing from `bindings`.
    pub fn render(
        &self,
        template: &'static str,
        bindings: &Bindings,
    ) -> Result<String> {
        self.registry.render(template, bindings).map_err(|source| {
            CodegenError::Template {
                template,
                source: Box::new(source),
            }
            .into()
        })
    }
}
