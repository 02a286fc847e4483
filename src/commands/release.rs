//! Release command implementation

use std::path::PathBuf;

use crate::cli::AppArgs;
use crate::commands::helpers::{build_context, open_cache};
use crate::container::{ReleaseDescriptor, TomcatContainer};
use crate::error::Result;

/// Print the release descriptor for a compiled application
pub fn run(cache_dir: Option<PathBuf>, args: AppArgs) -> Result<()> {
    let mut context = build_context(&args)?;
    let cache = open_cache(cache_dir)?;
    let mut container = TomcatContainer::new(&mut context, &cache, args.container.as_deref())?;

    let command = container.release()?;
    print!("{}", ReleaseDescriptor::web(command).to_yaml()?);
    Ok(())
}
