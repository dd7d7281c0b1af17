//! Template renderer

#[cfg(test)]
use mockall::mock;

use super::errors::RenderError;

/// Variables passed to a template
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// Renders a named template against a set of variables
pub trait Renderer: Send + Sync + 'static {
    /// Render a template
    ///
    /// # Arguments
    /// * `template` - The name of the template.
    /// * `variables` - The variables available to the template.
    ///
    /// # Returns
    /// A [`Result`] containing the rendered output.
    fn render(&self, template: &str, variables: &Variables) -> Result<String, RenderError>;
}

#[cfg(test)]
mock! {
    pub Renderer {}

    impl Renderer for Renderer {
        fn render(&self, template: &str, variables: &Variables) -> Result<String, RenderError>;
    }
}
