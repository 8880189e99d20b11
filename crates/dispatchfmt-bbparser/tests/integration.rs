use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use dispatchfmt_bbparser::{
    formatter_fn, BBParser, BuildError, ComplexFormatter, ConfigError, FormatError,
    FormatterLoadError, HandlerError, ModuleTable, ParentTag, RenderContext,
    SimpleFormatterConfig, SimpleFormattersConfig, TagAttributes, TagOptions,
};
use proptest::prelude::*;

fn simple_config() -> SimpleFormattersConfig {
    let mut config = SimpleFormattersConfig::new();
    config.insert("b".into(), SimpleFormatterConfig::new("[b]%s[/b]"));
    config.insert(
        "note".into(),
        SimpleFormatterConfig::new("[i]Note:[/i] %s").with_options(TagOptions::new().strip(true)),
    );
    config.insert(
        "li".into(),
        SimpleFormatterConfig::new("[*]%s").with_options(
            TagOptions::new()
                .newline_closes(true)
                .same_tag_closes(true),
        ),
    );
    config.insert(
        "url".into(),
        SimpleFormatterConfig::new("[url=%(url)s]%s[/url]"),
    );
    config
}

#[derive(Default)]
struct NationLink;

impl ComplexFormatter for NationLink {
    fn format(
        &self,
        _tag_name: &str,
        value: &str,
        _options: &TagAttributes,
        _parent: Option<ParentTag<'_>>,
        _context: &RenderContext,
    ) -> Result<String, HandlerError> {
        let slug = value.trim().to_lowercase().replace(' ', "_");
        Ok(format!("[nation={slug}]{}[/nation]", value.trim()))
    }
}

fn formatter_modules() -> ModuleTable {
    ModuleTable::new().module("dispatch/formatters", |registry| {
        registry
            .register::<NationLink>("nation", TagOptions::new().render_embedded(false))
            .register_handler(
                "stat",
                TagOptions::new().standalone(true),
                formatter_fn(|_, _, attrs, _, context| {
                    let key = attrs.get("stat").ok_or("stat tag needs a name")?;
                    let value = context
                        .get("stats")
                        .and_then(|stats| stats.get(key))
                        .ok_or_else(|| format!("unknown stat {key}"))?;
                    Ok(format!("[b]{value}[/b]"))
                }),
            );
    })
}

fn dispatch_parser() -> BBParser {
    let modules = formatter_modules();
    BBParser::builder()
        .simple_formatters(simple_config())
        .complex_formatters("dispatch/formatters", &modules)
        .build()
        .unwrap()
}

fn stats_context() -> RenderContext {
    let mut context = RenderContext::new();
    context.insert(
        "stats".into(),
        serde_json::json!({ "population": 1200, "gdp": "4.5 trillion" }),
    );
    context
}

#[test]
fn formats_a_dispatch() {
    let parser = dispatch_parser();
    let input = "Welcome to [nation]Test Landia[/nation]!\n\
                 [li]Population: [stat=population]\n\
                 [li]GDP: [stat=gdp]\n\
                 [note]  Figures are approximate.  [/note]\n\
                 See [url=https://example.com]the wiki[/url].";
    let expected = "Welcome to [nation=test_landia]Test Landia[/nation]!\n\
                    [*]Population: [b]1200[/b]\
                    [*]GDP: [b]\"4.5 trillion\"[/b]\
                    [i]Note:[/i] Figures are approximate.\n\
                    See [url=https://example.com]the wiki[/url].";
    assert_eq!(parser.format(input, &stats_context()).unwrap(), expected);
}

#[test]
fn list_items_close_on_next_item() {
    let parser = dispatch_parser();
    let input = "[li]one[li]two";
    assert_eq!(
        parser.format(input, &RenderContext::new()).unwrap(),
        "[*]one[*]two"
    );
}

#[test]
fn handler_failure_reaches_the_caller() {
    let parser = dispatch_parser();
    let err = parser
        .format("[stat=missing]", &stats_context())
        .unwrap_err();
    match err {
        FormatError::Handler { tag, source } => {
            assert_eq!(tag, "stat");
            assert_eq!(source.to_string(), "unknown stat missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn handlers_keep_state_for_the_parser_lifetime() {
    let counter = Rc::new(Cell::new(0));
    let seen = Rc::clone(&counter);
    let modules = ModuleTable::new().module("counting", move |registry| {
        let seen = Rc::clone(&seen);
        registry.register_handler(
            "n",
            TagOptions::new().standalone(true),
            formatter_fn(move |_, _, _, _, _| {
                seen.set(seen.get() + 1);
                Ok(seen.get().to_string())
            }),
        );
    });
    let parser = BBParser::builder()
        .complex_formatters("counting", &modules)
        .build()
        .unwrap();

    let context = RenderContext::new();
    assert_eq!(parser.format("[n] [n]", &context).unwrap(), "1 2");
    assert_eq!(parser.format("[n]", &context).unwrap(), "3");
    assert_eq!(counter.get(), 3);
}

#[test]
fn bad_source_fails_the_whole_build() {
    let modules = ModuleTable::new().module("broken", |registry| {
        let construct = || -> Result<NationLink, HandlerError> { Err("missing API key".into()) };
        registry.register_with("nation", TagOptions::new(), construct);
    });
    let err = BBParser::builder()
        .simple_formatters(simple_config())
        .complex_formatters("broken", &modules)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::FormatterLoad(FormatterLoadError::Construct { ref tag, .. }) if tag == "nation"
    ));

    let err = BBParser::builder()
        .complex_formatters(Path::new("formatters/absent"), &modules)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("formatters/absent"));
    assert!(matches!(err, BuildError::Config(ConfigError::SourceNotFound { .. })));
}

proptest! {
    /// Text without brackets comes back byte for byte.
    #[test]
    fn plain_text_is_unchanged(text in "[^\\[]{0,200}") {
        let parser = dispatch_parser();
        prop_assert_eq!(parser.format(&text, &stats_context()).unwrap(), text);
    }

    /// Markup built only from unregistered tag names is left alone.
    #[test]
    fn unknown_markup_is_unchanged(text in "[\\[\\]/=c-hx-z \"\\n\\r]{0,200}") {
        let parser = dispatch_parser();
        prop_assert_eq!(parser.format(&text, &stats_context()).unwrap(), text);
    }

    /// A registered simple tag wraps any bracket-free body.
    #[test]
    fn simple_tag_wraps_body(body in "[^\\[]{0,50}") {
        let mut config = SimpleFormattersConfig::new();
        config.insert("b".into(), SimpleFormatterConfig::new("<b>%s</b>"));
        let parser = BBParser::builder().simple_formatters(config).build().unwrap();
        let input = format!("[b]{body}[/b]");
        prop_assert_eq!(
            parser.format(&input, &RenderContext::new()).unwrap(),
            format!("<b>{body}</b>")
        );
    }

    /// Tag names match regardless of case.
    #[test]
    fn tag_names_are_case_insensitive(upper in any::<bool>(), body in "[a-z ]{0,20}") {
        let parser = dispatch_parser();
        let tag = if upper { "NOTE" } else { "note" };
        let input = format!("[{tag}]{body}[/{tag}]");
        prop_assert_eq!(
            parser.format(&input, &RenderContext::new()).unwrap(),
            format!("[i]Note:[/i] {}", body.trim())
        );
    }
}
