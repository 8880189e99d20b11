//! BBCode-style tag transformer for dispatch markup.
//!
//! Text written with `[tag]content[/tag]` markup is rewritten by formatters
//! registered per tag name. There are two kinds:
//!
//! - **Simple formatters** are `%`-templates declared in configuration:
//!   `"[b]%s[/b]"` wraps the body, `%(key)s` inserts a tag attribute.
//! - **Complex formatters** are code: anything implementing
//!   [`ComplexFormatter`], declared into a [`FormatterRegistry`] by a
//!   [`FormatterSource`].
//!
//! [`BBParser`] chains both kinds, complex first. Tags that no formatter
//! knows are copied through verbatim, so markup meant for a later stage
//! survives.
//!
//! # Example
//!
//! ```rust
//! use dispatchfmt_bbparser::{
//!     formatter_fn, BBParser, ModuleTable, RenderContext, SimpleFormatterConfig,
//!     SimpleFormattersConfig, TagOptions,
//! };
//!
//! let mut simple = SimpleFormattersConfig::new();
//! simple.insert("b".into(), SimpleFormatterConfig::new("<b>%s</b>"));
//! simple.insert("box".into(), SimpleFormatterConfig::new("<box attr=%(a)s>%s</box>"));
//!
//! let modules = ModuleTable::new().module("formatters", |registry| {
//!     registry.register_handler(
//!         "nation",
//!         TagOptions::new().standalone(true),
//!         formatter_fn(|_, _, _, _, context| {
//!             Ok(context["nation"].as_str().unwrap_or_default().to_string())
//!         }),
//!     );
//! });
//!
//! let parser = BBParser::builder()
//!     .simple_formatters(simple)
//!     .complex_formatters("formatters", &modules)
//!     .build()
//!     .unwrap();
//!
//! let mut context = RenderContext::new();
//! context.insert("nation".into(), "Testlandia".into());
//!
//! let out = parser
//!     .format("[b]Hello[/b] [nation] [box a=1]z[/box] [u]kept[/u]", &context)
//!     .unwrap();
//! assert_eq!(out, "<b>Hello</b> Testlandia <box attr=1>z</box> [u]kept[/u]");
//! ```
//!
//! # Tag syntax
//!
//! - Names are case-insensitive: `[B]` and `[b]` are the same tag.
//! - `[name=value]` sets the attribute `name`; `[name a=1 b="x y"]` sets `a`
//!   and `b`. A bare word is an attribute with an empty value.
//! - A close tag with no open counterpart is dropped; an open tag with no
//!   close runs to the end of the enclosing text.
//!
//! How a tag's extent is found is controlled per formatter by
//! [`TagOptions`].

mod compile;
mod error;
mod formatter;
mod options;
mod parser;
mod pipeline;
mod registry;
mod source;
mod template;
mod tokenizer;

pub use compile::{
    build_complex_parser, build_simple_parser, ComplexCompiler, SimpleFormatterConfig,
    SimpleFormattersConfig,
};
pub use error::{BuildError, ConfigError, FormatError, FormatterLoadError, HandlerError};
pub use formatter::{formatter_fn, ComplexFormatter, ParentTag, RenderContext};
pub use options::TagOptions;
pub use parser::TagParser;
pub use pipeline::{BBParser, BBParserBuilder};
pub use registry::{FormatterRegistry, LoadedFormatter};
pub use source::{FormatterSource, ModuleTable, SourceError};
pub use template::{SimpleTemplate, TemplateSyntaxError};
pub use tokenizer::{is_valid_tag_name, TagAttributes};
