//! Tokenizer for BBCode-style tags.
//!
//! The tokenizer only produces tag tokens for names the caller recognizes.
//! Everything else, including well-formed tags nobody registered, comes out
//! as literal data so it survives into the output unchanged.

use std::collections::BTreeMap;

/// Attributes given at a tag's invocation site, e.g. `[box a=1 b="x y"]`.
///
/// Keys are lowercased; values are trimmed. For `[url=http://x]` the tag
/// name doubles as the key: `{"url": "http://x"}`.
pub type TagAttributes = BTreeMap<String, String>;

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Plain text without newlines.
    Data(&'a str),
    /// A single `\n`.
    Newline,
    /// Opening tag of a recognized formatter.
    OpenTag {
        name: String,
        attrs: TagAttributes,
        raw: &'a str,
    },
    /// Closing tag of a recognized formatter.
    CloseTag { name: String, raw: &'a str },
}

impl<'a> Token<'a> {
    /// The exact input text this token was read from.
    pub(crate) fn raw(&self) -> &'a str {
        match self {
            Token::Data(text) => text,
            Token::Newline => "\n",
            Token::OpenTag { raw, .. } | Token::CloseTag { raw, .. } => raw,
        }
    }
}

/// Checks whether a tag name can be produced by the tokenizer.
///
/// Names are matched lowercased, so only the lowercase form is valid here.
/// A valid name is non-empty and contains no whitespace, brackets, quotes,
/// `=` or `/`.
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !matches!(c, '[' | ']' | '=' | '/' | '"' | '\'')
        })
        && name.to_lowercase() == name
}

/// Splits `input` into tokens, keeping only tags for which `is_known` holds.
pub(crate) fn tokenize<'a>(input: &'a str, is_known: impl Fn(&str) -> bool) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(offset) = input[pos..].find('[') {
        let start = pos + offset;
        push_text(&mut tokens, &input[pos..start]);

        let (end, closed) = tag_extent(input, start);
        let candidate = &input[start..end];
        match closed.then(|| parse_tag(candidate)).flatten() {
            Some(ParsedTag::Open(name, attrs)) if is_known(&name) => {
                tokens.push(Token::OpenTag {
                    name,
                    attrs,
                    raw: candidate,
                });
            }
            Some(ParsedTag::Close(name)) if is_known(&name) => {
                tokens.push(Token::CloseTag {
                    name,
                    raw: candidate,
                });
            }
            _ => push_text(&mut tokens, candidate),
        }
        pos = end;
    }

    push_text(&mut tokens, &input[pos..]);
    tokens
}

/// Pushes text as data and newline tokens.
fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            tokens.push(Token::Newline);
        }
        if !line.is_empty() {
            tokens.push(Token::Data(line));
        }
    }
}

/// Finds where a tag starting at `start` ends.
///
/// Returns the end offset and whether a closing `]` was found. A `[` outside
/// quotes ends the scan early: the text before it is not a tag.
fn tag_extent(input: &str, start: usize) -> (usize, bool) {
    let mut in_quote: Option<char> = None;
    let mut quotable = false;

    for (offset, ch) in input[start + 1..].char_indices() {
        let i = start + 1 + offset;
        match ch {
            '=' => quotable = true,
            '"' | '\'' => {
                if quotable && in_quote.is_none() {
                    in_quote = Some(ch);
                } else if in_quote == Some(ch) {
                    in_quote = None;
                    quotable = false;
                }
            }
            '[' if in_quote.is_none() => return (i, false),
            ']' if in_quote.is_none() => return (i + 1, true),
            _ => {}
        }
    }

    (input.len(), false)
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedTag {
    Open(String, TagAttributes),
    Close(String),
}

/// Parses a complete `[...]` span into a tag, if it is one.
fn parse_tag(tag: &str) -> Option<ParsedTag> {
    if tag.contains(['\n', '\r']) {
        return None;
    }
    let inner = tag.strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return None;
    }

    if let Some(name) = inner.strip_prefix('/') {
        return Some(ParsedTag::Close(name.trim().to_lowercase()));
    }

    if inner.contains(['=', ' ']) {
        let (name, attrs) = parse_attributes(inner);
        Some(ParsedTag::Open(name.trim().to_lowercase(), attrs))
    } else {
        Some(ParsedTag::Open(inner.to_lowercase(), TagAttributes::new()))
    }
}

/// Splits the inside of an opening tag into its name and attributes.
fn parse_attributes(data: &str) -> (String, TagAttributes) {
    let chars: Vec<char> = data.trim().chars().collect();
    let mut name: Option<String> = None;
    let mut attrs = TagAttributes::new();
    let mut attr = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut in_quote: Option<char> = None;
    let mut attr_done = false;

    let mut pos = 0;
    while pos < chars.len() {
        let ch = chars[pos];
        if in_value {
            if let Some(quote) = in_quote {
                if ch == '\\' && matches!(chars.get(pos + 1), Some('\\' | '"' | '\'')) {
                    value.push(chars[pos + 1]);
                    pos += 1;
                } else if ch == quote {
                    in_quote = None;
                    in_value = false;
                    if !attr.is_empty() {
                        attrs.insert(attr.to_lowercase(), value.trim().to_string());
                    }
                    attr.clear();
                    value.clear();
                } else {
                    value.push(ch);
                }
            } else if ch == '"' || ch == '\'' {
                in_quote = Some(ch);
            } else if ch == ' ' && chars[pos + 1..].contains(&'=') {
                // Without a later `=`, an unquoted value may contain spaces.
                attrs.insert(attr.to_lowercase(), value.trim().to_string());
                attr.clear();
                value.clear();
                in_value = false;
            } else {
                value.push(ch);
            }
        } else if ch == '=' {
            in_value = true;
            if name.is_none() {
                name = Some(attr.clone());
            }
        } else if ch == ' ' {
            attr_done = true;
        } else {
            if attr_done {
                if !attr.is_empty() {
                    if name.is_none() {
                        name = Some(attr.clone());
                    } else {
                        attrs.insert(attr.to_lowercase(), String::new());
                    }
                }
                attr.clear();
                attr_done = false;
            }
            attr.push(ch);
        }
        pos += 1;
    }

    if !attr.is_empty() {
        if name.is_none() {
            name = Some(attr.clone());
        }
        attrs.insert(attr.to_lowercase(), value.trim().to_string());
    }

    (name.unwrap_or_default(), attrs)
}
