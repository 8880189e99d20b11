//! Template engine abstraction.
//!
//! [`TemplateEngine`] is what the dispatch renderer needs from a template
//! backend. The default implementation is [`MiniJinjaEngine`], which pulls
//! templates from a [`TemplateSource`] on first use.

use std::collections::BTreeSet;

use dispatchfmt_bbparser::RenderContext;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Template, UndefinedBehavior, Value};

use crate::error::RenderError;
use crate::source::TemplateSource;

/// A template engine that renders dispatch templates with a context.
pub trait TemplateEngine: Send + Sync {
    /// Renders the template registered or loadable under `name`.
    fn render_named(&self, name: &str, context: &RenderContext) -> Result<String, RenderError>;

    /// Compiles and renders a template string in one step.
    fn render_template(
        &self,
        template: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError>;

    /// Checks whether a template can be found for `name`.
    fn has_template(&self, name: &str) -> bool;
}

/// MiniJinja-based template engine.
///
/// Blocks are trimmed (`trim_blocks`), undefined variables render as empty
/// text and output is never auto-escaped. Variables a named template reads
/// but the context lacks are logged at debug level.
///
/// # Example
///
/// ```rust
/// use dispatchfmt_render::{MemorySource, MiniJinjaEngine, RenderContext, TemplateEngine};
///
/// let source = MemorySource::new().with("greeting", "Hello, {{ name }}!");
/// let engine = MiniJinjaEngine::new(source);
///
/// let mut context = RenderContext::new();
/// context.insert("name".into(), "World".into());
/// assert_eq!(engine.render_named("greeting", &context).unwrap(), "Hello, World!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates an engine that loads templates from `source`.
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_loader(move |name| {
            source.load(name).map_err(|err| {
                let detail = format!("failed to load template: {err}");
                Error::new(ErrorKind::InvalidOperation, detail).with_source(err)
            })
        });
        Self { env }
    }

    /// Registers a single-argument filter, usable as `{{ value | name }}`.
    ///
    /// Filters with extra arguments can be added through
    /// [`environment_mut`](Self::environment_mut).
    pub fn add_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value) -> Result<String, Error> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(filter = %name, "loaded template filter");
        self.env.add_filter(name, move |value: Value| filter(value));
    }

    /// Names `template` reads that are neither in `context` nor globals.
    fn undefined_variables(
        &self,
        template: &Template<'_, '_>,
        context: &RenderContext,
    ) -> BTreeSet<String> {
        template
            .undeclared_variables(false)
            .into_iter()
            .filter(|var| !context.contains_key(var))
            .filter(|var| !self.env.globals().any(|(global, _)| global == var))
            .collect()
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_named(&self, name: &str, context: &RenderContext) -> Result<String, RenderError> {
        let template = self.env.get_template(name).map_err(|err| match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(name.to_string()),
            _ => RenderError::from(err),
        })?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            for variable in self.undefined_variables(&template, context) {
                tracing::debug!(
                    template = name,
                    variable = %variable,
                    "undefined template variable"
                );
            }
        }

        Ok(template.render(Value::from_serialize(context))?)
    }

    fn render_template(
        &self,
        template: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError> {
        let context = Value::from_serialize(context);
        Ok(self.env.render_str(template, context)?)
    }

    fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}
