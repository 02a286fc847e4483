use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    tomcat-provisioner cache\n\n\
                  List cached artifacts:\n    tomcat-provisioner cache list\n\n\
                  Clear all cached artifacts:\n    tomcat-provisioner cache clear\n\n\
                  Remove one artifact:\n    tomcat-provisioner cache clear --only tomcat")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List cached artifacts
    List,

    /// Clear cached artifacts
    Clear(ClearCacheArgs),
}

/// Arguments for cache clear command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Remove only the artifact with this name (e.g., tomcat)
    #[arg(long)]
    pub only: Option<String>,
}
