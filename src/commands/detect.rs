//! Detect command implementation

use std::path::PathBuf;

use crate::cli::AppArgs;
use crate::commands::helpers::{build_context, open_cache};
use crate::container::TomcatContainer;
use crate::error::Result;

/// Print the identity strings when the application needs a container
///
/// Returns whether the provisioner applies; nothing is printed otherwise.
pub fn run(cache_dir: Option<PathBuf>, args: AppArgs) -> Result<bool> {
    let mut context = build_context(&args)?;
    let cache = open_cache(cache_dir)?;
    let container = TomcatContainer::new(&mut context, &cache, args.container.as_deref())?;

    match container.detect() {
        Some(ids) => {
            println!("{}", ids.join(" "));
            Ok(true)
        }
        None => Ok(false),
    }
}
