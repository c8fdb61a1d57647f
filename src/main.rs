//! NuGet packager CLI
//!
//! Command-line front end: resolves the selected project, runs the
//! packaging scripts and streams their output.

use clap::Parser;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nuget_packager::cli::{Cli, CliContext, CommandDispatcher};

/// Diagnostics go to stderr; stdout carries the output pane
fn init_tracing(verbose: bool) {
    let default = if verbose { "nuget_packager=debug" } else { "nuget_packager=warn" };
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli, context: &CliContext) -> anyhow::Result<()> {
    let working_dir = match &cli.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let dispatcher = CommandDispatcher::new(context.clone(), working_dir, cli.config.clone());
    dispatcher.dispatch(&cli.command)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = CliContext::new(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli, &context) {
        context.error(&format!("{}", e));
        process::exit(1);
    }
}
