//! Template renderer backed by minijinja
//!
//! Templates are looked up by file name relative to the template directory,
//! e.g. `welcome.html`. HTML templates are auto-escaped, so a layout must
//! print its `content` variable with the `safe` filter.

use std::path::Path;

use minijinja::{path_loader, Environment, ErrorKind};
use tracing::debug;

use crate::domain::communication::mailer::{RenderError, Renderer, Variables};

/// Template renderer
#[derive(Debug)]
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Create a renderer loading templates from `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(path));

        Self { env }
    }

    /// Create a renderer without a template directory
    pub fn empty() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Register a template from source
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.into(), source.into())
            .map_err(|err| RenderError::UnknownError(err.into()))
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, template: &str, variables: &Variables) -> Result<String, RenderError> {
        let compiled = self.env.get_template(template).map_err(|err| {
            debug!(template, ?err, "failed to load template");

            match err.kind() {
                ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(template.to_string()),
                _ => RenderError::UnknownError(err.into()),
            }
        })?;

        compiled
            .render(variables)
            .map_err(|err| RenderError::UnknownError(err.into()))
    }
}
