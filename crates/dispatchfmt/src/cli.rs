//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Render dispatch templates and transform their markup.
#[derive(Debug, Parser)]
#[command(name = "dispatchfmt", version, about)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one or more dispatches
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Directory holding dispatch templates
    #[arg(long, value_name = "DIR")]
    pub templates: PathBuf,

    /// Simple formatter config (TOML)
    #[arg(long, value_name = "FILE")]
    pub formatters: Option<PathBuf>,

    /// Complex formatter source to load
    #[arg(long, value_name = "PATH")]
    pub complex: Option<PathBuf>,

    /// Template variable file (TOML, YAML or JSON); may be repeated
    #[arg(long = "vars", value_name = "FILE")]
    pub vars: Vec<PathBuf>,

    /// Variable group mapping people to their info; may be repeated
    #[arg(long = "people-info-group", value_name = "GROUP")]
    pub people_info_groups: Vec<String>,

    /// Variable group whose names are replaced with people info; may be repeated
    #[arg(long = "personnel-group", value_name = "GROUP")]
    pub personnel_groups: Vec<String>,

    /// Write each dispatch to <DIR>/<name>.txt instead of stdout
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Names of the dispatches to render
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}
