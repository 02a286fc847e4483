//! Compile command implementation

use std::path::PathBuf;

use crate::cli::AppArgs;
use crate::commands::helpers::{build_context, open_cache};
use crate::container::TomcatContainer;
use crate::error::Result;

/// Stage the container for the application
pub fn run(cache_dir: Option<PathBuf>, args: AppArgs) -> Result<()> {
    let mut context = build_context(&args)?;
    let cache = open_cache(cache_dir)?;
    let container = TomcatContainer::new(&mut context, &cache, args.container.as_deref())?;

    container.compile()
}
