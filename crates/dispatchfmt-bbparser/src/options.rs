//! Per-tag parse and render options.

/// Options controlling how a single tag is matched and rendered.
///
/// Options are fixed when a formatter is registered and copied into the
/// parser's rule set. The builder methods consume and return `self` so a
/// set of options reads as one expression:
///
/// ```rust
/// use dispatchfmt_bbparser::TagOptions;
///
/// let opts = TagOptions::new().strip(true).render_embedded(false);
/// assert!(opts.strip);
/// assert!(!opts.render_embedded);
/// assert!(!opts.standalone);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagOptions {
    /// A newline at the tag's level closes it.
    pub newline_closes: bool,
    /// An opening tag of the same name closes the currently open one.
    pub same_tag_closes: bool,
    /// The tag has no body and no closing counterpart.
    pub standalone: bool,
    /// Nested tags in the body are resolved before this tag's handler runs.
    pub render_embedded: bool,
    /// Leading and trailing whitespace is trimmed from the body.
    pub strip: bool,
    /// A single newline right after the closing tag is dropped.
    pub swallow_trailing_newline: bool,
}

impl TagOptions {
    /// Default options: everything off except `render_embedded`.
    pub const fn new() -> Self {
        Self {
            newline_closes: false,
            same_tag_closes: false,
            standalone: false,
            render_embedded: true,
            strip: false,
            swallow_trailing_newline: false,
        }
    }

    pub const fn newline_closes(mut self, value: bool) -> Self {
        self.newline_closes = value;
        self
    }

    pub const fn same_tag_closes(mut self, value: bool) -> Self {
        self.same_tag_closes = value;
        self
    }

    pub const fn standalone(mut self, value: bool) -> Self {
        self.standalone = value;
        self
    }

    pub const fn render_embedded(mut self, value: bool) -> Self {
        self.render_embedded = value;
        self
    }

    pub const fn strip(mut self, value: bool) -> Self {
        self.strip = value;
        self
    }

    pub const fn swallow_trailing_newline(mut self, value: bool) -> Self {
        self.swallow_trailing_newline = value;
        self
    }
}

impl Default for TagOptions {
    fn default() -> Self {
        Self::new()
    }
}
