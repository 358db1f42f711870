//! Template compilation and rendering.
//! Templates are compiled once and rendered once per row with MiniJinja.
use minijinja::{AutoEscape, Environment};

use crate::error::{Error, Result};
use crate::model::FlatModel;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Compiles `source` and keeps it under `name`.
    ///
    /// # Errors
    /// * `Error::TemplateCompileError` if the template has a syntax error
    fn compile(&mut self, name: &str, source: String) -> Result<()>;

    /// Renders the template compiled under `name` against `model`.
    ///
    /// # Arguments
    /// * `name` - Name the template was compiled under
    /// * `row` - 1-based data row number, used in error reports
    /// * `model` - Variables available to the template
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template text
    fn render(&self, name: &str, row: usize, model: &FlatModel) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer that keeps template text verbatim: no auto-escaping
    /// and the trailing newline preserved.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn compile(&mut self, name: &str, source: String) -> Result<()> {
        self.env
            .add_template_owned(name.to_string(), source)
            .map_err(|err| Error::TemplateCompileError { template: name.to_string(), source: err })
    }

    fn render(&self, name: &str, row: usize, model: &FlatModel) -> Result<String> {
        let render_error =
            |source| Error::RenderError { template: name.to_string(), row, source };

        let tmpl = self.env.get_template(name).map_err(render_error)?;
        tmpl.render(model).map_err(render_error)
    }
}
