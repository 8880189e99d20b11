//! Compiled `format_string` templates for simple formatters.
//!
//! Placeholder syntax:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `%s` | the tag body |
//! | `%(value)s` | the tag body |
//! | `%(key)s` | the invocation attribute `key` |
//! | `%%` | a literal `%` |

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;
use crate::tokenizer::TagAttributes;

/// Template syntax error with the byte offset where it was found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {offset}")]
pub struct TemplateSyntaxError {
    pub offset: usize,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value,
    Attribute(String),
}

/// A `format_string` parsed once into literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl SimpleTemplate {
    /// Parses a template string.
    pub fn parse(source: &str) -> Result<Self, TemplateSyntaxError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices();

        while let Some((offset, ch)) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }

            let placeholder = match chars.next() {
                Some((_, '%')) => {
                    literal.push('%');
                    continue;
                }
                Some((_, 's')) => Segment::Value,
                Some((_, '(')) => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some((_, ')')) => break,
                            Some((_, c)) => key.push(c),
                            None => {
                                return Err(TemplateSyntaxError {
                                    offset,
                                    message: "unterminated placeholder name",
                                })
                            }
                        }
                    }
                    if !matches!(chars.next(), Some((_, 's'))) {
                        return Err(TemplateSyntaxError {
                            offset,
                            message: "named placeholder must end with 's'",
                        });
                    }
                    if key == "value" {
                        Segment::Value
                    } else {
                        Segment::Attribute(key)
                    }
                }
                Some(_) => {
                    return Err(TemplateSyntaxError {
                        offset,
                        message: "unsupported placeholder",
                    })
                }
                None => {
                    return Err(TemplateSyntaxError {
                        offset,
                        message: "incomplete placeholder",
                    })
                }
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(placeholder);
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template for one tag invocation.
    pub fn render(
        &self,
        tag_name: &str,
        value: &str,
        attrs: &TagAttributes,
    ) -> Result<String, FormatError> {
        let mut output = String::with_capacity(self.source.len() + value.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Value => output.push_str(value),
                Segment::Attribute(key) => match attrs.get(key) {
                    Some(attr) => output.push_str(attr),
                    None => {
                        return Err(FormatError::MissingTemplateKey {
                            tag: tag_name.to_string(),
                            key: key.clone(),
                        })
                    }
                },
            }
        }
        Ok(output)
    }
}

impl FromStr for SimpleTemplate {
    type Err = TemplateSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SimpleTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &str, value: &str) -> String {
        SimpleTemplate::parse(template)
            .unwrap()
            .render("t", value, &TagAttributes::new())
            .unwrap()
    }

    #[test]
    fn positional_placeholder() {
        assert_eq!(render("<b>%s</b>", "hi"), "<b>hi</b>");
    }

    #[test]
    fn named_value_placeholder() {
        assert_eq!(render("[r1]%(value)s[/r1]", "a"), "[r1]a[/r1]");
    }

    #[test]
    fn percent_escape() {
        assert_eq!(render("%s%%", "50"), "50%");
    }

    #[test]
    fn no_placeholder() {
        assert_eq!(render("---", "ignored"), "---");
    }

    #[test]
    fn attribute_placeholder() {
        let template = SimpleTemplate::parse("<a href=\"%(url)s\">%s</a>").unwrap();
        let mut attrs = TagAttributes::new();
        attrs.insert("url".to_string(), "http://x".to_string());
        assert_eq!(
            template.render("url", "link", &attrs).unwrap(),
            "<a href=\"http://x\">link</a>"
        );
    }

    #[test]
    fn missing_attribute_is_format_error() {
        let template = SimpleTemplate::parse("%(color)s").unwrap();
        let err = template
            .render("c", "x", &TagAttributes::new())
            .unwrap_err();
        assert!(matches!(err, FormatError::MissingTemplateKey { ref key, .. } if key == "color"));
    }

    #[test]
    fn unsupported_placeholder_rejected() {
        let err = SimpleTemplate::parse("%d").unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn unterminated_name_rejected() {
        assert!(SimpleTemplate::parse("x %(value").is_err());
        assert!(SimpleTemplate::parse("%(value)d").is_err());
        assert!(SimpleTemplate::parse("trailing %").is_err());
    }

    #[test]
    fn display_is_source() {
        let template: SimpleTemplate = "<i>%s</i>".parse().unwrap();
        assert_eq!(template.to_string(), "<i>%s</i>");
    }
}
