//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - app: Arguments shared by detect, compile and release
//! - cache: Cache command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod app;
pub mod cache;
pub mod completions;

pub use app::AppArgs;
pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;

/// Tomcat provisioner - servlet container staging for web applications
#[derive(Parser, Debug)]
#[command(
    name = "tomcat-provisioner",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolves, caches and stages a servlet container for a web application",
    long_about = "Detects applications that carry a WEB-INF directory, resolves the Tomcat \
                  and support library versions to use, and stages them next to the \
                  application with the application deployed as the root context.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  tomcat-provisioner detect ./app                 \x1b[90m# Print resolved versions\x1b[0m\n   \
                  tomcat-provisioner compile ./app --lib-dir libs \x1b[90m# Stage Tomcat into ./app/.tomcat\x1b[0m\n   \
                  tomcat-provisioner release ./app                \x1b[90m# Print the release descriptor\x1b[0m\n   \
                  tomcat-provisioner cache                        \x1b[90m# Show download cache statistics\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Download cache directory
    #[arg(long, global = true, value_name = "DIR", env = "TOMCAT_PROVISIONER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved identities if the application needs a container
    Detect(AppArgs),

    /// Stage the container, support library and links
    Compile(AppArgs),

    /// Print the release descriptor with the launch command
    Release(AppArgs),

    /// Manage the download cache
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
