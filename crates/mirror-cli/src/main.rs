//! Package mirror CLI
//!
//! Regenerates a static package repository and synchronizes it with the
//! remote store.

mod cli;
mod commands;
mod error;
mod logging;
mod prompt;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::BuildOptions;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    tracing::trace!(verbosity = cli.verbose, "Logging initialized");

    match cli.command {
        Commands::Build {
            config_file,
            repository_urls,
            fresh,
            extensions,
            remote,
            staging_root,
            generator,
        } => commands::run_build(BuildOptions {
            config_file,
            repository_urls,
            fresh,
            extensions,
            remote,
            staging_root,
            generator,
        }),
        Commands::ListExtensions { json } => commands::run_list_extensions(json),
    }
}
