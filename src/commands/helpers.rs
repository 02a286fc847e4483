//! Command helper utilities

use std::path::PathBuf;

use crate::cache::{self, DownloadCache};
use crate::cli::AppArgs;
use crate::config::ContainerConfig;
use crate::context::ProvisioningContext;
use crate::error::Result;

/// Build the provisioning context described by the command line
pub fn build_context(args: &AppArgs) -> Result<ProvisioningContext> {
    let configuration = ContainerConfig::load(args.config.as_deref())?;

    ProvisioningContext::builder()
        .app_dir(&args.app_dir)
        .java_home(&args.java_home)
        .java_opts(args.java_opts.iter().cloned())
        .lib_directory(args.lib_dir.clone())
        .configuration(configuration)
        .build()
}

/// Resolve cache root from optional argument
///
/// If a cache directory is provided, use it. Otherwise, fall back
/// to the default cache location.
pub fn resolve_cache_root(cache_dir: Option<PathBuf>) -> Result<PathBuf> {
    match cache_dir {
        Some(path) => Ok(path),
        None => cache::cache_dir(),
    }
}

/// Open the download cache
pub fn open_cache(cache_dir: Option<PathBuf>) -> Result<DownloadCache> {
    DownloadCache::new(resolve_cache_root(cache_dir)?)
}
