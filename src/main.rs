//! Tomcat provisioner - servlet container staging for web applications
//!
//! Detects applications that need a servlet container, resolves the Tomcat and
//! support library versions to use, and stages them alongside the application
//! in a runnable layout.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod commands;
mod config;
mod container;
mod context;
mod error;
mod hash;
mod installer;
mod linker;
mod path_utils;
mod progress;
mod resolver;
mod resource;
mod stager;
mod transaction;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

/// Environment variable holding the log filter
const LOG_ENV: &str = "TOMCAT_PROVISIONER_LOG";

/// Log level used when no filter is configured
const DEFAULT_LOG_LEVEL: &str = "warn";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Detect(args) => match commands::detect::run(cli.cache_dir, args) {
            // Not applicable: silent failure so the framework tries the next provisioner
            Ok(false) => std::process::exit(1),
            other => other.map(|_| ()),
        },
        Commands::Compile(args) => commands::compile::run(cli.cache_dir, args),
        Commands::Release(args) => commands::release::run(cli.cache_dir, args),
        Commands::Cache(args) => commands::cache::run(cli.cache_dir, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(help) = miette::Diagnostic::help(&e) {
            eprintln!("Help: {}", help);
        }
        std::process::exit(1);
    }
}
