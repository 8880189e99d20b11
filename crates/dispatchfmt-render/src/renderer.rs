//! Dispatch rendering: template first, markup second.

use dispatchfmt_bbparser::{BBParser, RenderContext};
use minijinja::{Error, Value};

use crate::engine::{MiniJinjaEngine, TemplateEngine};
use crate::error::RenderError;
use crate::source::TemplateSource;

/// Context key holding the name of the dispatch being rendered.
pub const CURRENT_DISPATCH_NAME: &str = "current_dispatch_name";

/// Renders dispatches from templates and formats their markup.
///
/// Every render starts from a copy of the template variables given at
/// construction, adds [`CURRENT_DISPATCH_NAME`], renders the template with
/// that context and then runs the markup pipeline over the output with the
/// same context.
pub struct DispatchRenderer<E = MiniJinjaEngine> {
    engine: E,
    markup: BBParser,
    global_context: RenderContext,
}

impl DispatchRenderer<MiniJinjaEngine> {
    /// Creates a renderer using MiniJinja over `source`.
    pub fn new(
        source: impl TemplateSource + 'static,
        markup: BBParser,
        template_vars: RenderContext,
    ) -> Self {
        Self::with_engine(MiniJinjaEngine::new(source), markup, template_vars)
    }

    /// Registers a template filter. See [`MiniJinjaEngine::add_filter`].
    pub fn add_filter<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(Value) -> Result<String, Error> + Send + Sync + 'static,
    {
        self.engine.add_filter(name, filter);
        self
    }
}

impl<E: TemplateEngine> DispatchRenderer<E> {
    /// Creates a renderer on top of any template engine.
    pub fn with_engine(engine: E, markup: BBParser, template_vars: RenderContext) -> Self {
        Self {
            engine,
            markup,
            global_context: template_vars,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The template variables every render starts from.
    pub fn template_vars(&self) -> &RenderContext {
        &self.global_context
    }

    /// Renders the dispatch `name`.
    pub fn render(&self, name: &str) -> Result<String, RenderError> {
        let mut context = self.global_context.clone();
        context.insert(CURRENT_DISPATCH_NAME.to_string(), name.into());

        let rendered = self.engine.render_named(name, &context)?;
        let formatted = self.markup.format(&rendered, &context)?;
        tracing::debug!(dispatch = name, "rendered dispatch");

        Ok(formatted)
    }
}
