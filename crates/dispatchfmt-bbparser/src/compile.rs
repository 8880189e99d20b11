//! Building tag parsers from declarative config and from formatter sources.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, ConfigError, FormatterLoadError};
use crate::options::TagOptions;
use crate::parser::TagParser;
use crate::registry::FormatterRegistry;
use crate::source::{FormatterSource, SourceError};
use crate::template::SimpleTemplate;
use crate::tokenizer::is_valid_tag_name;

/// Simple formatter declarations keyed by tag name.
pub type SimpleFormattersConfig = BTreeMap<String, SimpleFormatterConfig>;

/// One simple formatter as written in configuration.
///
/// ```toml
/// [b]
/// format_string = "[b]%s[/b]"
///
/// [note]
/// format_string = "[i]Note:[/i] %s"
/// strip = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleFormatterConfig {
    /// Required; absence is reported when the parser is built.
    #[serde(default)]
    pub format_string: Option<String>,
    #[serde(default)]
    pub newline_closes: bool,
    #[serde(default)]
    pub same_tag_closes: bool,
    #[serde(default)]
    pub standalone: bool,
    #[serde(default = "default_render_embedded")]
    pub render_embedded: bool,
    #[serde(default)]
    pub strip: bool,
    #[serde(default)]
    pub swallow_trailing_newline: bool,
}

fn default_render_embedded() -> bool {
    true
}

impl SimpleFormatterConfig {
    /// A config entry with default flags.
    pub fn new(format_string: impl Into<String>) -> Self {
        Self {
            format_string: Some(format_string.into()),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: TagOptions) -> Self {
        self.newline_closes = options.newline_closes;
        self.same_tag_closes = options.same_tag_closes;
        self.standalone = options.standalone;
        self.render_embedded = options.render_embedded;
        self.strip = options.strip;
        self.swallow_trailing_newline = options.swallow_trailing_newline;
        self
    }

    /// The flags of this entry as [`TagOptions`].
    pub fn options(&self) -> TagOptions {
        TagOptions {
            newline_closes: self.newline_closes,
            same_tag_closes: self.same_tag_closes,
            standalone: self.standalone,
            render_embedded: self.render_embedded,
            strip: self.strip,
            swallow_trailing_newline: self.swallow_trailing_newline,
        }
    }
}

impl Default for SimpleFormatterConfig {
    fn default() -> Self {
        let options = TagOptions::default();
        Self {
            format_string: None,
            newline_closes: options.newline_closes,
            same_tag_closes: options.same_tag_closes,
            standalone: options.standalone,
            render_embedded: options.render_embedded,
            strip: options.strip,
            swallow_trailing_newline: options.swallow_trailing_newline,
        }
    }
}

/// Builds a parser holding one simple formatter per config entry.
///
/// Any bad entry fails the whole build.
pub fn build_simple_parser(config: &SimpleFormattersConfig) -> Result<TagParser, ConfigError> {
    let mut parser = TagParser::new();

    for (tag_name, entry) in config {
        let name = tag_name.trim().to_lowercase();
        if !is_valid_tag_name(&name) {
            return Err(ConfigError::InvalidTagName {
                tag: tag_name.clone(),
            });
        }
        let format_string = entry
            .format_string
            .as_deref()
            .ok_or_else(|| ConfigError::MissingFormatString {
                tag: tag_name.clone(),
            })?;
        let template =
            SimpleTemplate::parse(format_string).map_err(|err| ConfigError::InvalidTemplate {
                tag: tag_name.clone(),
                reason: err.to_string(),
            })?;

        parser.add_simple_formatter(&name, template, entry.options());
        tracing::debug!(tag = %name, "loaded simple formatter");
    }

    Ok(parser)
}

/// Builds a parser from every formatter pending in `registry`.
///
/// The registry is drained, so it is empty afterwards even on error.
pub fn build_complex_parser(
    registry: &mut FormatterRegistry,
) -> Result<TagParser, FormatterLoadError> {
    let mut parser = TagParser::new();
    for formatter in registry.drain()? {
        parser.add_boxed_formatter(&formatter.tag_name, formatter.handler, formatter.options);
        tracing::debug!(tag = %formatter.tag_name, "loaded complex formatter");
    }
    Ok(parser)
}

/// Compiles complex formatter sources into parsers.
///
/// The compiler owns the registry that sources declare into. Each
/// [`build`](Self::build) drains it, so a failed build leaves nothing behind
/// for the next one.
#[derive(Debug, Default)]
pub struct ComplexCompiler {
    registry: FormatterRegistry,
}

impl ComplexCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the source at `path` and compiles its formatters.
    pub fn build(
        &mut self,
        path: &Path,
        source: &dyn FormatterSource,
    ) -> Result<TagParser, BuildError> {
        if let Err(err) = source.load(path, &mut self.registry) {
            self.registry.clear();
            let path = path.to_path_buf();
            let err = match err {
                SourceError::NotFound => ConfigError::SourceNotFound { path },
                SourceError::Failed(source) => ConfigError::SourceFailed { path, source },
            };
            return Err(err.into());
        }

        let parser = build_complex_parser(&mut self.registry)?;
        tracing::debug!(path = %path.display(), "loaded complex formatter source");
        Ok(parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::formatter::{formatter_fn, RenderContext};
    use crate::source::ModuleTable;

    fn config(entries: &[(&str, SimpleFormatterConfig)]) -> SimpleFormattersConfig {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn format(parser: &TagParser, text: &str) -> String {
        parser.format(text, &RenderContext::new()).unwrap()
    }

    mod simple {
        use super::*;

        #[test]
        fn nested_formatters() {
            let parser = build_simple_parser(&config(&[
                ("t1", SimpleFormatterConfig::new("[r1]%(value)s[/r1]")),
                ("t2", SimpleFormatterConfig::new("[r2]%(value)s[/r2]")),
            ]))
            .unwrap();
            assert_eq!(
                format(&parser, "[t1]a[t2]b[/t2][/t1]"),
                "[r1]a[r2]b[/r2][/r1]"
            );
        }

        #[test]
        fn render_embedded_flag_is_used() {
            let parser = build_simple_parser(&config(&[
                (
                    "t1",
                    SimpleFormatterConfig::new("[r1]%(value)s[/r1]")
                        .with_options(TagOptions::new().render_embedded(false)),
                ),
                ("t2", SimpleFormatterConfig::new("[r2]%(value)s[/r2]")),
            ]))
            .unwrap();
            assert_eq!(
                format(&parser, "[t1]a[t2]b[/t2][/t1]"),
                "[r1]a[t2]b[/t2][/r1]"
            );
        }

        #[test]
        fn empty_config_passes_through() {
            let parser = build_simple_parser(&SimpleFormattersConfig::new()).unwrap();
            assert_eq!(
                format(&parser, "[t1]a[t2]b[/t2][/t1]"),
                "[t1]a[t2]b[/t2][/t1]"
            );
        }

        #[test]
        fn missing_format_string_is_fatal() {
            let mut entry = SimpleFormatterConfig::new("x");
            entry.format_string = None;
            let err = build_simple_parser(&config(&[
                ("ok", SimpleFormatterConfig::new("%s")),
                ("b", entry),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::MissingFormatString { ref tag } if tag == "b"));
        }

        #[test]
        fn bad_template_is_fatal() {
            let err = build_simple_parser(&config(&[("b", SimpleFormatterConfig::new("%d"))]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTemplate { ref tag, .. } if tag == "b"));
        }

        #[test]
        fn bad_tag_name_is_fatal() {
            let err = build_simple_parser(&config(&[("a b", SimpleFormatterConfig::new("%s"))]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTagName { .. }));
        }

        #[test]
        fn config_defaults_from_serde() {
            let entry: SimpleFormatterConfig =
                serde_json::from_value(serde_json::json!({ "format_string": "%s" })).unwrap();
            assert_eq!(entry.options(), TagOptions::default());

            let entry: SimpleFormatterConfig =
                serde_json::from_value(serde_json::json!({ "strip": true })).unwrap();
            assert!(entry.format_string.is_none());
            assert!(entry.strip);
            assert!(entry.render_embedded);
        }
    }

    mod complex {
        use super::*;
        use crate::formatter::{ComplexFormatter, ParentTag};
        use crate::tokenizer::TagAttributes;

        struct Unbuildable;

        impl ComplexFormatter for Unbuildable {
            fn format(
                &self,
                _tag_name: &str,
                _value: &str,
                _options: &TagAttributes,
                _parent: Option<ParentTag<'_>>,
                _context: &RenderContext,
            ) -> Result<String, HandlerError> {
                Ok(String::new())
            }
        }

        fn modules() -> ModuleTable {
            ModuleTable::new()
                .module("good", |registry| {
                    registry.register_handler(
                        "c1",
                        TagOptions::new(),
                        formatter_fn(|_, value, _, _, _| Ok(format!("[cr1]{value}[/cr1]"))),
                    );
                })
                .module("broken", |registry| {
                    registry
                        .register_handler(
                            "leak",
                            TagOptions::new(),
                            formatter_fn(|_, _, _, _, _| Ok("leaked".to_string())),
                        )
                        .register_with(
                            "bad",
                            TagOptions::new(),
                            || -> Result<Unbuildable, HandlerError> { Err("no".into()) },
                        );
                })
        }

        #[test]
        fn builds_from_source() {
            let mut compiler = ComplexCompiler::new();
            let parser = compiler.build(Path::new("good"), &modules()).unwrap();
            assert_eq!(format(&parser, "[c1]a[/c1]"), "[cr1]a[/cr1]");
        }

        #[test]
        fn missing_source_is_config_error() {
            let mut compiler = ComplexCompiler::new();
            let err = compiler.build(Path::new(""), &modules()).unwrap_err();
            assert!(matches!(err, BuildError::Config(ConfigError::SourceNotFound { .. })));
        }

        #[test]
        fn failed_source_is_config_error() {
            let source = |_: &Path, registry: &mut FormatterRegistry| -> Result<(), SourceError> {
                registry.register_handler(
                    "stale",
                    TagOptions::new(),
                    formatter_fn(|_, _, _, _, _| Ok(String::new())),
                );
                Err(SourceError::Failed("syntax error".into()))
            };
            let mut compiler = ComplexCompiler::new();
            let err = compiler.build(Path::new("x"), &source).unwrap_err();
            assert!(matches!(err, BuildError::Config(ConfigError::SourceFailed { .. })));

            let parser = compiler.build(Path::new("good"), &modules()).unwrap();
            assert_eq!(parser.tag_names(), vec!["c1"]);
        }

        #[test]
        fn load_error_does_not_leak_into_next_build() {
            let mut compiler = ComplexCompiler::new();
            let err = compiler.build(Path::new("broken"), &modules()).unwrap_err();
            assert!(matches!(err, BuildError::FormatterLoad(FormatterLoadError::Construct { .. })));

            let parser = compiler.build(Path::new("good"), &modules()).unwrap();
            assert_eq!(parser.tag_names(), vec!["c1"]);
            assert_eq!(format(&parser, "[leak]x[/leak]"), "[leak]x[/leak]");
        }
    }
}
