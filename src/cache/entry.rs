//! Cache entry metadata and integrity checks
//!
//! Every cached payload has a JSON sidecar recording what it is and the
//! BLAKE3 hash of its bytes. A payload whose hash no longer matches is
//! treated as a corrupt entry.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, fs as fs_error};
use crate::hash;

use super::paths::EntryPaths;

/// Sidecar describing a cached payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Logical artifact name
    pub name: String,
    /// Artifact version
    pub version: String,
    /// Source URI
    pub uri: String,
    /// Payload size in bytes
    pub size: u64,
    /// BLAKE3 hash of the payload
    pub hash: String,
}

/// State of an entry on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Payload and sidecar present and consistent
    Valid(CacheEntry),
    /// Nothing cached yet
    Missing,
    /// Payload or sidecar present but unusable
    Corrupt(String),
}

impl CacheEntry {
    /// Describe the payload at `payload`
    pub fn describe(name: &str, version: &str, uri: &str, payload: &Path) -> Result<Self> {
        let size = fs::metadata(payload)
            .map_err(|e| fs_error::failed(payload, e))?
            .len();
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            uri: uri.to_string(),
            size,
            hash: hash::hash_file(payload)?,
        })
    }

    /// Read the sidecar from disk
    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| fs_error::failed(path, e))?;
        serde_json::from_str(&json).map_err(|e| fs_error::failed(path, e))
    }

    /// Write the sidecar to disk
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| fs_error::failed(path, e))?;
        fs::write(path, json).map_err(|e| fs_error::failed(path, e))
    }
}

/// Inspect an entry, verifying the payload against its sidecar
pub fn inspect(paths: &EntryPaths) -> EntryState {
    let payload_exists = paths.payload.is_file();
    let metadata_exists = paths.metadata.is_file();

    match (payload_exists, metadata_exists) {
        (false, false) => EntryState::Missing,
        (true, false) => EntryState::Corrupt("metadata sidecar is missing".to_string()),
        (false, true) => EntryState::Corrupt("payload is missing".to_string()),
        (true, true) => {
            let entry = match CacheEntry::read(&paths.metadata) {
                Ok(entry) => entry,
                Err(e) => return EntryState::Corrupt(e.to_string()),
            };
            match hash::hash_file(&paths.payload) {
                Ok(actual) if hash::verify_hash(&entry.hash, &actual) => EntryState::Valid(entry),
                Ok(_) => EntryState::Corrupt("payload hash does not match".to_string()),
                Err(e) => EntryState::Corrupt(e.to_string()),
            }
        }
    }
}

/// Remove whatever is left of an entry
pub fn discard(paths: &EntryPaths) -> Result<()> {
    for path in [&paths.payload, &paths.metadata] {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(fs_error::failed(path, e)),
        }
    }
    Ok(())
}
