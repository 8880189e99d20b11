//! The tag parser: a rule set of formatters and the engine that applies it.
//!
//! A [`TagParser`] owns a set of rules keyed by tag name. Each rule pairs
//! [`TagOptions`] with either a compiled [`SimpleTemplate`] or a boxed
//! [`ComplexFormatter`]. `format` tokenizes the input against the known
//! names and resolves tags depth-first:
//!
//! ```text
//! [outer]a [inner]b[/inner][/outer]
//!   inner runs first on "b"            (outer renders embedded tags)
//!   outer runs on "a <inner output>"
//! ```
//!
//! Text that is not a registered tag is copied through unchanged. The parser
//! never escapes HTML, rewrites links, or applies cosmetic replacements, and
//! newlines stay `\n`.

use std::collections::HashMap;
use std::fmt;

use crate::error::FormatError;
use crate::formatter::{ComplexFormatter, ParentTag, RenderContext};
use crate::options::TagOptions;
use crate::template::SimpleTemplate;
use crate::tokenizer::{tokenize, TagAttributes, Token};

enum Formatter {
    Simple(SimpleTemplate),
    Complex(Box<dyn ComplexFormatter>),
}

struct TagRule {
    options: TagOptions,
    formatter: Formatter,
}

/// A set of tag formatters and the parser that applies them.
///
/// Registering a name twice replaces the earlier formatter.
#[derive(Default)]
pub struct TagParser {
    rules: HashMap<String, TagRule>,
}

impl TagParser {
    /// Creates a parser with no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a formatter defined by a template.
    pub fn add_simple_formatter(
        &mut self,
        tag_name: &str,
        template: SimpleTemplate,
        options: TagOptions,
    ) -> &mut Self {
        self.insert(tag_name, options, Formatter::Simple(template))
    }

    /// Adds a formatter backed by a handler.
    pub fn add_complex_formatter(
        &mut self,
        tag_name: &str,
        formatter: impl ComplexFormatter + 'static,
        options: TagOptions,
    ) -> &mut Self {
        self.add_boxed_formatter(tag_name, Box::new(formatter), options)
    }

    /// Adds an already boxed handler.
    pub fn add_boxed_formatter(
        &mut self,
        tag_name: &str,
        formatter: Box<dyn ComplexFormatter>,
        options: TagOptions,
    ) -> &mut Self {
        self.insert(tag_name, options, Formatter::Complex(formatter))
    }

    fn insert(&mut self, tag_name: &str, options: TagOptions, formatter: Formatter) -> &mut Self {
        let name = tag_name.to_lowercase();
        if self.rules.contains_key(&name) {
            tracing::debug!(tag = %name, "replacing formatter");
        }
        self.rules.insert(name, TagRule { options, formatter });
        self
    }

    /// Whether a formatter is registered for `tag_name`.
    pub fn has_tag(&self, tag_name: &str) -> bool {
        self.rules.contains_key(&tag_name.to_lowercase())
    }

    /// Registered tag names, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Formats `text` with the registered formatters.
    ///
    /// Tags without a formatter are left exactly as written. Errors returned
    /// by handlers abort the call and are returned as-is.
    pub fn format(&self, text: &str, context: &RenderContext) -> Result<String, FormatError> {
        if self.rules.is_empty() {
            return Ok(text.to_string());
        }
        let tokens = tokenize(text, |name| self.rules.contains_key(name));
        self.format_tokens(&tokens, None, context)
    }

    fn format_tokens(
        &self,
        tokens: &[Token<'_>],
        parent: Option<ParentTag<'_>>,
        context: &RenderContext,
    ) -> Result<String, FormatError> {
        let mut output = String::new();
        let mut idx = 0;

        while idx < tokens.len() {
            match &tokens[idx] {
                Token::Data(text) => output.push_str(text),
                Token::Newline => output.push('\n'),
                // Close tags without an open counterpart are dropped.
                Token::CloseTag { .. } => {}
                Token::OpenTag { name, attrs, raw } => {
                    let Some(rule) = self.rules.get(name) else {
                        output.push_str(raw);
                        idx += 1;
                        continue;
                    };

                    if rule.options.standalone {
                        output.push_str(&self.render(name, rule, "", attrs, parent, context)?);
                    } else {
                        let (mut end, consume) = find_closing(name, &rule.options, tokens, idx + 1);
                        let body = &tokens[idx + 1..end];
                        if !consume {
                            end -= 1;
                        }

                        let mut inner = if rule.options.render_embedded {
                            let this = ParentTag {
                                name: name.as_str(),
                                options: &rule.options,
                            };
                            self.format_tokens(body, Some(this), context)?
                        } else {
                            body.iter().map(Token::raw).collect()
                        };
                        if rule.options.strip {
                            inner = inner.trim().to_string();
                        }

                        output.push_str(&self.render(name, rule, &inner, attrs, parent, context)?);

                        if rule.options.swallow_trailing_newline
                            && matches!(tokens.get(end + 1), Some(Token::Newline))
                        {
                            end += 1;
                        }
                        idx = end;
                    }
                }
            }
            idx += 1;
        }

        Ok(output)
    }

    fn render(
        &self,
        name: &str,
        rule: &TagRule,
        value: &str,
        attrs: &TagAttributes,
        parent: Option<ParentTag<'_>>,
        context: &RenderContext,
    ) -> Result<String, FormatError> {
        match &rule.formatter {
            Formatter::Simple(template) => template.render(name, value, attrs),
            Formatter::Complex(handler) => handler
                .format(name, value, attrs, parent, context)
                .map_err(|source| FormatError::Handler {
                    tag: name.to_string(),
                    source,
                }),
        }
    }
}

impl fmt::Debug for TagParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagParser")
            .field("tags", &self.tag_names())
            .finish()
    }
}

/// Finds the token that ends the tag opened just before `start`.
///
/// Returns the index of the ending token and whether that token belongs to
/// the tag (a close tag or a closing newline) or starts the next content (a
/// same-name open tag). Reaching the end of input closes the tag.
fn find_closing(
    name: &str,
    options: &TagOptions,
    tokens: &[Token<'_>],
    start: usize,
) -> (usize, bool) {
    let mut embedded = 0usize;

    for (pos, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::Newline if options.newline_closes => return (pos, true),
            Token::OpenTag { name: other, .. } if other == name => {
                if options.same_tag_closes {
                    return (pos, false);
                }
                if options.render_embedded {
                    embedded += 1;
                }
            }
            Token::CloseTag { name: other, .. } if other == name => {
                if embedded == 0 {
                    return (pos, true);
                }
                embedded -= 1;
            }
            _ => {}
        }
    }

    (tokens.len(), true)
}
