//! The complex formatter capability.

use std::collections::BTreeMap;

use crate::error::HandlerError;
use crate::options::TagOptions;
use crate::tokenizer::TagAttributes;

/// Caller-supplied values threaded through one `format` call.
///
/// Every complex handler invoked during that call sees the same context.
pub type RenderContext = BTreeMap<String, serde_json::Value>;

/// The tag enclosing the one being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentTag<'a> {
    pub name: &'a str,
    pub options: &'a TagOptions,
}

/// A tag handler backed by code.
///
/// The handler is created once per compile and reused for every `format`
/// call on the resulting parser, so state kept in the handler (behind a
/// `Cell` or `RefCell`) lives as long as the parser.
///
/// # Example
///
/// ```rust
/// use dispatchfmt_bbparser::{
///     ComplexFormatter, HandlerError, ParentTag, RenderContext, TagAttributes,
/// };
///
/// #[derive(Default)]
/// struct BoxFormatter;
///
/// impl ComplexFormatter for BoxFormatter {
///     fn format(
///         &self,
///         _tag_name: &str,
///         value: &str,
///         options: &TagAttributes,
///         _parent: Option<ParentTag<'_>>,
///         _context: &RenderContext,
///     ) -> Result<String, HandlerError> {
///         let attr = options.get("a").map(String::as_str).unwrap_or("");
///         Ok(format!("<box attr={attr}>{value}</box>"))
///     }
/// }
/// ```
pub trait ComplexFormatter {
    /// Renders one tag occurrence.
    ///
    /// * `tag_name` - the lowercased tag name
    /// * `value` - the body, already resolved if the tag renders embedded
    ///   tags; empty for standalone tags
    /// * `options` - attributes given at the invocation site
    /// * `parent` - the enclosing tag, `None` at the top level
    /// * `context` - the render context of the current `format` call
    ///
    /// The returned string replaces the whole tag span.
    fn format(
        &self,
        tag_name: &str,
        value: &str,
        options: &TagAttributes,
        parent: Option<ParentTag<'_>>,
        context: &RenderContext,
    ) -> Result<String, HandlerError>;
}

impl<F> ComplexFormatter for F
where
    F: Fn(
        &str,
        &str,
        &TagAttributes,
        Option<ParentTag<'_>>,
        &RenderContext,
    ) -> Result<String, HandlerError>,
{
    fn format(
        &self,
        tag_name: &str,
        value: &str,
        options: &TagAttributes,
        parent: Option<ParentTag<'_>>,
        context: &RenderContext,
    ) -> Result<String, HandlerError> {
        self(tag_name, value, options, parent, context)
    }
}

/// Pins a closure to the handler signature so it can be used as a
/// [`ComplexFormatter`] without spelling out argument types.
///
/// ```rust
/// use dispatchfmt_bbparser::{formatter_fn, RenderContext, TagOptions, TagParser};
///
/// let mut parser = TagParser::new();
/// parser.add_complex_formatter(
///     "up",
///     formatter_fn(|_, value, _, _, _| Ok(value.to_uppercase())),
///     TagOptions::new(),
/// );
/// assert_eq!(parser.format("[up]hi[/up]", &RenderContext::new()).unwrap(), "HI");
/// ```
pub fn formatter_fn<F>(f: F) -> F
where
    F: Fn(
        &str,
        &str,
        &TagAttributes,
        Option<ParentTag<'_>>,
        &RenderContext,
    ) -> Result<String, HandlerError>,
{
    f
}
