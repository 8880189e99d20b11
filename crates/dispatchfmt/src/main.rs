use std::io;
use std::process::ExitCode;

use clap::Parser;
use dispatchfmt::Cli;
use dispatchfmt_bbparser::ModuleTable;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose forces debug, otherwise RUST_LOG or warn
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    match dispatchfmt::run(&cli, &ModuleTable::new(), &mut stdout.lock()) {
        Ok(report) => {
            for failure in &report.failed {
                eprintln!("error: dispatch \"{}\": {:#}", failure.name, failure.error);
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
