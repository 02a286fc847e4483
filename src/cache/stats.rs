//! Cache statistics and management
//!
//! This module provides functions for listing, removing, and
//! getting statistics about cached artifacts.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{ProvisionError, Result};

use super::entry::CacheEntry;
use super::paths::{self, METADATA_EXTENSION};

/// Cached artifact information (by artifact name)
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    /// Artifact name (e.g. tomcat)
    pub name: String,
    /// Cached versions, sorted
    pub versions: Vec<String>,
    /// Total size in bytes
    pub size: u64,
}

impl CachedArtifact {
    /// Format size as human-readable string
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of distinct artifacts cached
    pub artifacts: usize,
    /// Number of cached versions across all artifacts
    pub versions: usize,
    /// Total size in bytes
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        format_size(self.total_size)
    }
}

fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{} B", bytes)
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}

/// List all cached artifacts under `root`, sorted by name
pub fn list_cached_artifacts(root: &Path) -> Result<Vec<CachedArtifact>> {
    let path = paths::artifacts_dir(root);

    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for artifact_dir in read_subdirs(&path)? {
        let mut name = artifact_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut versions = Vec::new();
        let mut size = 0;

        for version_dir in read_subdirs(&artifact_dir)? {
            if let Some(recorded) = recorded_name(&version_dir) {
                name = recorded;
            }
            versions.push(
                version_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            size += dir_size(&version_dir)?;
        }

        versions.sort();
        artifacts.push(CachedArtifact {
            name,
            versions,
            size,
        });
    }

    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}

/// Remove every cached version of one artifact
pub fn remove_cached_artifact(root: &Path, name: &str) -> Result<()> {
    let path = paths::artifact_dir(root, name);

    if !path.exists() {
        return Err(ProvisionError::CacheOperationFailed {
            message: format!("Artifact not found in cache: {}", name),
        });
    }

    fs::remove_dir_all(&path).map_err(|e| ProvisionError::CacheOperationFailed {
        message: format!("Failed to remove cached artifact: {}", e),
    })
}

/// Get cache statistics
pub fn cache_stats(root: &Path) -> Result<CacheStats> {
    let artifacts = list_cached_artifacts(root)?;
    Ok(CacheStats {
        artifacts: artifacts.len(),
        versions: artifacts.iter().map(|a| a.versions.len()).sum(),
        total_size: artifacts.iter().map(|a| a.size).sum(),
    })
}

/// Clear the entire artifact cache
pub fn clear_cache(root: &Path) -> Result<()> {
    let path = paths::artifacts_dir(root);
    if path.exists() {
        fs::remove_dir_all(&path).map_err(|e| ProvisionError::CacheOperationFailed {
            message: format!("Failed to clear cache: {}", e),
        })?;
    }
    Ok(())
}

fn read_subdirs(path: &Path) -> Result<Vec<std::path::PathBuf>> {
    let entries = fs::read_dir(path).map_err(|e| ProvisionError::CacheOperationFailed {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ProvisionError::CacheOperationFailed {
            message: format!("Failed to read entry: {}", e),
        })?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

/// Artifact name as recorded by any sidecar in a version directory
fn recorded_name(version_dir: &Path) -> Option<String> {
    fs::read_dir(version_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(METADATA_EXTENSION))
        .find_map(|p| CacheEntry::read(&p).ok())
        .map(|entry| entry.name)
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> Result<u64> {
    let mut size = 0u64;
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            size += entry
                .metadata()
                .map_err(|e| ProvisionError::CacheOperationFailed {
                    message: format!("Failed to get metadata: {}", e),
                })?
                .len();
        }
    }
    Ok(size)
}
