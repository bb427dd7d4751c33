//! salaryprep: Salary Survey Preprocessing CLI
//!
//! Loads raw survey files, cleans and encodes the features, cleans the
//! salary target and writes model-ready tables.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use salaryprep::cli::{commands, Cli};
use salaryprep::utils::{print_banner, print_completion, print_config};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "salaryprep=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    print_banner(env!("CARGO_PKG_VERSION"), cli.command.title());
    print_config(&commands::config_entries(&cli.command));

    let summary = commands::run(&cli.command)?;

    summary.display();
    print_completion();

    Ok(())
}
