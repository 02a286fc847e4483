//! Cache command implementation

use std::path::{Path, PathBuf};

use crate::cache;
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::commands::helpers::resolve_cache_root;
use crate::error::Result;

pub fn run(cache_dir: Option<PathBuf>, args: CacheArgs) -> Result<()> {
    let root = resolve_cache_root(cache_dir)?;

    // Handle subcommands
    if let Some(command) = args.command {
        match command {
            CacheSubcommand::List => {
                list_cached_artifacts(&root)?;
                return Ok(());
            }
            CacheSubcommand::Clear(clear_args) => {
                if let Some(name) = clear_args.only {
                    clean_specific_artifact(&root, &name)?;
                } else {
                    clean_all_cache(&root)?;
                }
                return Ok(());
            }
        }
    }

    // Default: show only cache statistics
    show_cache_stats(&root)?;

    Ok(())
}

fn print_stats_header(root: &Path) -> Result<usize> {
    let stats = cache::cache_stats(root)?;

    println!("Cache Statistics:");
    println!("  Location: {}", root.display());
    println!("  Artifacts: {}", stats.artifacts);
    println!("  Versions: {}", stats.versions);
    println!("  Size: {}", stats.formatted_size());

    Ok(stats.artifacts)
}

fn show_cache_stats(root: &Path) -> Result<()> {
    if print_stats_header(root)? == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'tomcat-provisioner cache list' to list cached artifacts.");
        println!("Run 'tomcat-provisioner cache clear' to remove everything from cache.");
        println!("Run 'tomcat-provisioner cache clear --only <name>' to remove a specific artifact.");
    }

    Ok(())
}

fn list_cached_artifacts(root: &Path) -> Result<()> {
    // Show the same statistics header as `tomcat-provisioner cache` before listing
    print_stats_header(root)?;
    println!();

    let artifacts = cache::list_cached_artifacts(root)?;

    if artifacts.is_empty() {
        println!("No cached artifacts.");
        return Ok(());
    }

    println!("Cached artifacts ({}):", artifacts.len());
    for artifact in &artifacts {
        println!(
            "  {} ({} version{}, {})",
            artifact.name,
            artifact.versions.len(),
            if artifact.versions.len() == 1 { "" } else { "s" },
            artifact.formatted_size()
        );
        println!("    Versions: {}", artifact.versions.join(", "));
    }

    Ok(())
}

fn clean_all_cache(root: &Path) -> Result<()> {
    cache::clear_cache(root)?;
    println!("Cache cleared successfully.");
    Ok(())
}

fn clean_specific_artifact(root: &Path, name: &str) -> Result<()> {
    cache::remove_cached_artifact(root, name)?;
    println!("Removed cached artifact: {}", name);
    Ok(())
}
