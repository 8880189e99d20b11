//! Dispatch rendering on top of the markup pipeline.
//!
//! A dispatch is produced in two steps: its template is rendered with
//! MiniJinja, then the result is passed through a
//! [`BBParser`](dispatchfmt_bbparser::BBParser) that rewrites the custom
//! markup tags. [`DispatchRenderer`] ties the two together; the
//! [`config`] functions load the files that configure them.
//!
//! ```rust
//! use dispatchfmt_bbparser::{SimpleFormatterConfig, SimpleFormattersConfig};
//! use dispatchfmt_render::{BBParser, DispatchRenderer, MemorySource, RenderContext};
//!
//! let mut simple = SimpleFormattersConfig::new();
//! simple.insert("b".into(), SimpleFormatterConfig::new("<b>%s</b>"));
//! let markup = BBParser::builder().simple_formatters(simple).build().unwrap();
//!
//! let source = MemorySource::new().with("news", "[b]{{ current_dispatch_name }}[/b]");
//! let renderer = DispatchRenderer::new(source, markup, RenderContext::new());
//! assert_eq!(renderer.render("news").unwrap(), "<b>news</b>");
//! ```

pub mod config;
mod engine;
mod error;
mod renderer;
mod source;

pub use config::{
    load_simple_formatters, load_template_vars, replace_personnel_names, resolve_personnel,
    PeopleInfo,
};
pub use dispatchfmt_bbparser::{BBParser, RenderContext};
pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use error::RenderError;
pub use renderer::{DispatchRenderer, CURRENT_DISPATCH_NAME};
pub use source::{DirectorySource, MemorySource, TemplateSource};
