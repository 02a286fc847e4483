//! Support library installation
//!
//! The support library is a single JAR placed in the runtime's `lib`
//! directory as `<runtime>-buildpack-support-<version>.jar`. Nothing is
//! extracted.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::ArtifactCache;
use crate::error::Result;
use crate::resolver::ResolvedVersion;

/// Extension of the installed library
const JAR_EXTENSION: &str = "jar";

/// Places the support JAR inside a staged runtime
pub struct SupportLibraryInstaller<'a> {
    cache: &'a dyn ArtifactCache,
}

impl<'a> SupportLibraryInstaller<'a> {
    /// Create an installer fetching through `cache`
    pub fn new(cache: &'a dyn ArtifactCache) -> Self {
        Self { cache }
    }

    /// File name the support library is installed under
    pub fn file_name(resolved: &ResolvedVersion) -> String {
        format!("{}.{JAR_EXTENSION}", resolved.id())
    }

    /// Copy the support JAR into `lib_dir`, returning its path
    ///
    /// # Errors
    ///
    /// Download failures name the support library and its version.
    pub fn install(&self, resolved: &ResolvedVersion, lib_dir: &Path) -> Result<PathBuf> {
        let destination = lib_dir.join(Self::file_name(resolved));
        self.cache.fetch_to(&resolved.name, resolved, &destination)?;
        debug!(path = %destination.display(), "installed {resolved}");
        Ok(destination)
    }
}
