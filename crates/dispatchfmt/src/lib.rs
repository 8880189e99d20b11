//! The `dispatchfmt` command.
//!
//! The binary is a thin wrapper around [`run`]. Downstream binaries that
//! compile their own complex formatters pass them in as a
//! [`FormatterSource`] and select one with `--complex`.

pub mod cli;

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use dispatchfmt_bbparser::{BBParser, FormatterSource};
use dispatchfmt_render::{
    load_simple_formatters, load_template_vars, resolve_personnel, DirectorySource,
    DispatchRenderer,
};

pub use cli::{Cli, Command, RenderArgs};

/// A dispatch that could not be rendered or written.
#[derive(Debug)]
pub struct Failure {
    pub name: String,
    pub error: anyhow::Error,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct Report {
    pub rendered: Vec<String>,
    pub failed: Vec<Failure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Executes `cli`, writing dispatches to `stdout` unless `--out` is given.
///
/// Setup problems (bad config, unknown formatter source) abort the run. A
/// dispatch that fails to render is recorded in the [`Report`] and the
/// remaining dispatches are still rendered.
pub fn run(
    cli: &Cli,
    sources: &dyn FormatterSource,
    stdout: &mut dyn Write,
) -> anyhow::Result<Report> {
    match &cli.command {
        Command::Render(args) => render(args, sources, stdout),
    }
}

fn build_markup(args: &RenderArgs, sources: &dyn FormatterSource) -> anyhow::Result<BBParser> {
    let mut builder = BBParser::builder();
    if let Some(path) = &args.formatters {
        let config = load_simple_formatters(path)?;
        builder = builder.simple_formatters(config);
    }
    if let Some(path) = &args.complex {
        builder = builder.complex_formatters(path, sources);
    }
    Ok(builder.build()?)
}

fn render(
    args: &RenderArgs,
    sources: &dyn FormatterSource,
    stdout: &mut dyn Write,
) -> anyhow::Result<Report> {
    let markup = build_markup(args, sources).context("failed to set up markup formatters")?;
    let mut vars = load_template_vars(&args.vars).context("failed to load template variables")?;
    resolve_personnel(&mut vars, &args.people_info_groups, &args.personnel_groups)
        .context("failed to resolve personnel info")?;
    let renderer = DispatchRenderer::new(DirectorySource::new(&args.templates), markup, vars);

    if let Some(out) = &args.out {
        fs::create_dir_all(out)
            .with_context(|| format!("failed to create output directory {}", out.display()))?;
    }

    let mut report = Report::default();
    for name in &args.names {
        let result = renderer
            .render(name)
            .map_err(anyhow::Error::from)
            .and_then(|text| emit(name, &text, args.out.as_deref(), stdout));

        match result {
            Ok(()) => report.rendered.push(name.clone()),
            Err(error) => {
                tracing::debug!(dispatch = %name, error = %error, "dispatch failed");
                report.failed.push(Failure {
                    name: name.clone(),
                    error,
                });
            }
        }
    }

    Ok(report)
}

fn emit(
    name: &str,
    text: &str,
    out_dir: Option<&Path>,
    stdout: &mut dyn Write,
) -> anyhow::Result<()> {
    match out_dir {
        Some(dir) => {
            let path = dir.join(format!("{name}.txt"));
            fs::write(&path, text)
                .with_context(|| format!("failed to write dispatch to {}", path.display()))?;
            tracing::debug!(dispatch = name, path = %path.display(), "wrote dispatch");
        }
        None => {
            writeln!(stdout, "{text}").context("failed to write to stdout")?;
        }
    }
    Ok(())
}
