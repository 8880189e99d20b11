//! Two-pass markup transformation: complex formatters, then simple ones.
//!
//! ```text
//! raw markup
//!   → complex pass   (handlers from a formatter source)
//!   → simple pass    (templates from config)
//!   → final text
//! ```
//!
//! Each pass reparses the whole text and leaves tags it does not know
//! untouched, so tags meant for the simple pass survive the complex one. A
//! tag configured in both passes is consumed by the complex pass; the simple
//! pass only sees it again if a handler writes that tag into its output.

use std::path::{Path, PathBuf};

use crate::compile::{build_simple_parser, ComplexCompiler, SimpleFormattersConfig};
use crate::error::{BuildError, FormatError};
use crate::formatter::RenderContext;
use crate::parser::TagParser;
use crate::source::FormatterSource;

/// The markup pipeline applied to rendered dispatches.
#[derive(Debug, Default)]
pub struct BBParser {
    complex: Option<TagParser>,
    simple: Option<TagParser>,
}

impl BBParser {
    /// Starts building a pipeline.
    pub fn builder<'a>() -> BBParserBuilder<'a> {
        BBParserBuilder::default()
    }

    /// Assembles a pipeline from already built passes.
    pub fn from_parsers(complex: Option<TagParser>, simple: Option<TagParser>) -> Self {
        Self { complex, simple }
    }

    /// A pipeline with neither pass; `format` returns its input.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn complex_parser(&self) -> Option<&TagParser> {
        self.complex.as_ref()
    }

    pub fn simple_parser(&self) -> Option<&TagParser> {
        self.simple.as_ref()
    }

    /// Runs the complex pass, then the simple pass, over `text`.
    pub fn format(&self, text: &str, context: &RenderContext) -> Result<String, FormatError> {
        let mut formatted = match &self.complex {
            Some(parser) => parser.format(text, context)?,
            None => text.to_string(),
        };
        if let Some(parser) = &self.simple {
            formatted = parser.format(&formatted, context)?;
        }
        Ok(formatted)
    }
}

/// Builder for [`BBParser`].
///
/// ```rust
/// use dispatchfmt_bbparser::{
///     BBParser, RenderContext, SimpleFormatterConfig, SimpleFormattersConfig,
/// };
///
/// let mut simple = SimpleFormattersConfig::new();
/// simple.insert("b".to_string(), SimpleFormatterConfig::new("<b>%s</b>"));
///
/// let parser = BBParser::builder().simple_formatters(simple).build().unwrap();
/// assert_eq!(parser.format("[b]hi[/b]", &RenderContext::new()).unwrap(), "<b>hi</b>");
/// ```
#[derive(Default)]
pub struct BBParserBuilder<'a> {
    simple: Option<SimpleFormattersConfig>,
    complex: Option<(PathBuf, &'a dyn FormatterSource)>,
}

impl<'a> BBParserBuilder<'a> {
    /// Configures the simple pass.
    pub fn simple_formatters(mut self, config: SimpleFormattersConfig) -> Self {
        self.simple = Some(config);
        self
    }

    /// Configures the complex pass from the source at `path`.
    pub fn complex_formatters(
        mut self,
        path: impl AsRef<Path>,
        source: &'a dyn FormatterSource,
    ) -> Self {
        self.complex = Some((path.as_ref().to_path_buf(), source));
        self
    }

    /// Compiles every configured pass. Any failure fails the whole build.
    pub fn build(self) -> Result<BBParser, BuildError> {
        let simple = self.simple.as_ref().map(build_simple_parser).transpose()?;

        let complex = match self.complex {
            Some((path, source)) => Some(ComplexCompiler::new().build(&path, source)?),
            None => None,
        };

        Ok(BBParser { complex, simple })
    }
}
