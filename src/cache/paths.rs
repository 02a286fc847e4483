//! Cache path utilities and constants
//!
//! ```text
//! <cache root>/
//! └── artifacts/
//!     └── <artifact name>/
//!         └── <version>/
//!             ├── <uri key>.cached
//!             └── <uri key>.json
//! ```

use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};
use crate::hash;
use crate::path_utils;

/// Default cache directory name under user's cache directory
const CACHE_DIR: &str = "tomcat-provisioner";

/// Environment variable overriding the cache location
pub const CACHE_DIR_ENV: &str = "TOMCAT_PROVISIONER_CACHE_DIR";

/// Artifacts subdirectory within cache
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Extension of cached payload files
pub const PAYLOAD_EXTENSION: &str = "cached";

/// Extension of the metadata sidecar next to each payload
pub const METADATA_EXTENSION: &str = "json";

/// Length of the URI digest used as the entry key
const KEY_LEN: usize = 16;

/// Get the default cache directory path
///
/// Uses the platform's standard cache location (e.g. XDG on Linux, Library/Caches on macOS)
/// with a `tomcat-provisioner` subdirectory. Can be overridden with the
/// `TOMCAT_PROVISIONER_CACHE_DIR` environment variable.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(cache_dir) = std::env::var(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(cache_dir));
    }

    let base = dirs::cache_dir().ok_or_else(|| ProvisionError::CacheOperationFailed {
        message: "Could not determine cache directory".to_string(),
    })?;

    Ok(base.join(CACHE_DIR))
}

/// Directory holding every artifact under a cache root
pub fn artifacts_dir(root: &Path) -> PathBuf {
    root.join(ARTIFACTS_DIR)
}

/// Directory holding all versions of one artifact
pub fn artifact_dir(root: &Path, name: &str) -> PathBuf {
    artifacts_dir(root).join(path_utils::make_path_safe(name))
}

/// Cache key for a download URI
pub fn uri_key(uri: &str) -> String {
    hash::short_digest(uri, KEY_LEN)
}

/// Payload and metadata paths of one cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPaths {
    /// Directory containing the entry
    pub dir: PathBuf,
    /// Cached artifact bytes
    pub payload: PathBuf,
    /// JSON sidecar describing the payload
    pub metadata: PathBuf,
}

/// Locate the entry for `name` at `version` downloaded from `uri`
pub fn entry_paths(root: &Path, name: &str, version: &str, uri: &str) -> EntryPaths {
    let dir = artifact_dir(root, name).join(path_utils::make_path_safe(version));
    let key = uri_key(uri);
    EntryPaths {
        payload: dir.join(format!("{key}.{PAYLOAD_EXTENSION}")),
        metadata: dir.join(format!("{key}.{METADATA_EXTENSION}")),
        dir,
    }
}
