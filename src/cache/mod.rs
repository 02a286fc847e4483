//! Artifact download cache
//!
//! This module handles fetching runtime archives and support libraries and
//! keeping them on disk so repeated provisioning runs do not download
//! again.
//!
//! ## Cache Structure
//!
//! ```text
//! ~/.cache/tomcat-provisioner/
//! └── artifacts/
//!     └── <artifact name>/
//!         └── <version>/
//!             ├── <uri digest>.cached
//!             └── <uri digest>.json
//! ```
//!
//! The staging code only sees the [`ArtifactCache`] trait: given a logical
//! name and a resolved version it gets back a local file, or an error.

pub mod entry;
pub mod paths;
pub mod stats;
pub mod transport;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ProvisionError, Result, download, fs as fs_error};
use crate::resolver::ResolvedVersion;

pub use entry::{CacheEntry, EntryState};
pub use paths::cache_dir;
pub use stats::{cache_stats, clear_cache, list_cached_artifacts, remove_cached_artifact};

/// Overall timeout for a single HTTP request
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Source of local copies of remote artifacts
pub trait ArtifactCache {
    /// Return a local file holding the artifact's bytes
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::DownloadFailed`] when the artifact cannot be
    /// obtained.
    fn fetch(&self, name: &str, resolved: &ResolvedVersion) -> Result<PathBuf>;

    /// Place a copy of the artifact at `destination`
    fn fetch_to(&self, name: &str, resolved: &ResolvedVersion, destination: &Path) -> Result<()> {
        let cached = self.fetch(name, resolved)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error::failed(parent, e))?;
        }
        fs::copy(&cached, destination)
            .map(|_| ())
            .map_err(|e| fs_error::failed(destination, e))
    }
}

/// On-disk, content-verified download cache
#[derive(Debug)]
pub struct DownloadCache {
    root: PathBuf,
    client: Client,
}

impl DownloadCache {
    /// Create a cache rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tomcat-provisioner/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ProvisionError::CacheOperationFailed {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            root: root.into(),
            client,
        })
    }

    fn download(
        &self,
        name: &str,
        resolved: &ResolvedVersion,
        entry: &paths::EntryPaths,
    ) -> Result<()> {
        let version = resolved.version.to_string();
        let failed = |reason: String| download::failed(name, &version, &resolved.uri, reason);

        fs::create_dir_all(&entry.dir).map_err(|e| failed(e.to_string()))?;

        // Stage into the entry directory so the final rename stays on one filesystem
        let mut staging = NamedTempFile::new_in(&entry.dir).map_err(|e| failed(e.to_string()))?;
        let bytes = transport::fetch_into(&self.client, &resolved.uri, staging.as_file_mut())
            .map_err(&failed)?;
        staging
            .as_file()
            .sync_all()
            .map_err(|e| failed(e.to_string()))?;
        staging
            .persist(&entry.payload)
            .map_err(|e| failed(e.error.to_string()))?;

        CacheEntry::describe(name, &version, &resolved.uri, &entry.payload)?
            .write(&entry.metadata)?;
        info!(name, version = %version, bytes, "cached artifact");
        Ok(())
    }
}

impl ArtifactCache for DownloadCache {
    fn fetch(&self, name: &str, resolved: &ResolvedVersion) -> Result<PathBuf> {
        let version = resolved.version.to_string();
        let entry = paths::entry_paths(&self.root, name, &version, &resolved.uri);

        match entry::inspect(&entry) {
            EntryState::Valid(_) => {
                debug!(name, version = %version, "cache hit");
                return Ok(entry.payload);
            }
            EntryState::Corrupt(reason) => {
                warn!(name, version = %version, reason = %reason, "discarding corrupt cache entry");
                entry::discard(&entry)?;
            }
            EntryState::Missing => {
                debug!(name, version = %version, "cache miss");
            }
        }

        if let Err(err) = self.download(name, resolved, &entry) {
            // remove_dir only succeeds on the empty directories a failed download leaves
            let _ = fs::remove_dir(&entry.dir);
            if let Some(artifact_dir) = entry.dir.parent() {
                let _ = fs::remove_dir(artifact_dir);
            }
            return Err(err);
        }
        Ok(entry.payload)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::resolver::Version;

    fn resolved(uri: &Path) -> ResolvedVersion {
        ResolvedVersion {
            name: "tomcat".to_string(),
            version: Version::parse("7.0.42").expect("version"),
            uri: uri.display().to_string(),
        }
    }

    #[test]
    fn test_fetch_copies_into_cache() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let source = temp.path().join("apache-tomcat-7.0.42.tar.gz");
        fs::write(&source, b"archive").expect("write source");

        let cache = DownloadCache::new(temp.path().join("cache")).expect("cache");
        let cached = cache.fetch("tomcat", &resolved(&source)).expect("fetch");

        assert!(cached.starts_with(temp.path().join("cache")));
        assert_eq!(fs::read(&cached).expect("read"), b"archive");
    }

    #[test]
    fn test_second_fetch_is_a_cache_hit() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let source = temp.path().join("apache-tomcat-7.0.42.tar.gz");
        fs::write(&source, b"archive").expect("write source");

        let cache = DownloadCache::new(temp.path().join("cache")).expect("cache");
        let first = cache.fetch("tomcat", &resolved(&source)).expect("fetch");

        // Source gone: only the cache can satisfy the second request
        fs::remove_file(&source).expect("remove source");
        let second = cache.fetch("tomcat", &resolved(&source)).expect("cache hit");
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_entry_is_refetched() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let source = temp.path().join("apache-tomcat-7.0.42.tar.gz");
        fs::write(&source, b"archive").expect("write source");

        let cache = DownloadCache::new(temp.path().join("cache")).expect("cache");
        let cached = cache.fetch("tomcat", &resolved(&source)).expect("fetch");
        fs::write(&cached, b"garbage").expect("corrupt");

        let refetched = cache.fetch("tomcat", &resolved(&source)).expect("refetch");
        assert_eq!(fs::read(&refetched).expect("read"), b"archive");
    }

    #[test]
    fn test_missing_source_is_download_error() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let cache = DownloadCache::new(temp.path().join("cache")).expect("cache");
        let err = cache
            .fetch("tomcat", &resolved(&temp.path().join("missing.tar.gz")))
            .expect_err("missing source");

        assert!(matches!(err, ProvisionError::DownloadFailed { .. }));
        assert!(err.to_string().contains("tomcat"));
        assert!(err.to_string().contains("7.0.42"));
        assert!(!temp.path().join("cache/artifacts/tomcat").exists());
    }

    #[test]
    fn test_fetch_to_places_file() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let source = temp.path().join("support.jar");
        fs::write(&source, b"jar").expect("write source");

        let cache = DownloadCache::new(temp.path().join("cache")).expect("cache");
        let destination = temp.path().join("runtime/lib/support-1.1.0.jar");
        cache
            .fetch_to("support", &resolved(&source), &destination)
            .expect("fetch_to");
        assert_eq!(fs::read(&destination).expect("read"), b"jar");
    }
}
