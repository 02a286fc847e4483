//! Symbolic links exposing the application inside the staged runtime
//!
//! - [`ApplicationLinker`]: `webapps/ROOT` pointing at the application root
//! - [`LibraryLinker`]: one link per extra library in `WEB-INF/lib`
//!
//! Links are always relative, computed between symlink-free absolute
//! paths, so the whole application tree can be moved as a unit.

pub mod application;
pub mod library;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use wax::{CandidatePath, Glob, Pattern};

use crate::error::{Result, fs as fs_error};

pub use application::ApplicationLinker;
pub use library::LibraryLinker;

/// Library files picked up from the extra library directory
pub const LIBRARY_PATTERN: &str = "*.jar";

/// Remove whatever is at `path` without following links
///
/// Returns whether anything was removed.
pub fn remove_entry(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(fs_error::failed(path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        remove_link_or_file(path)
    };
    result.map_err(|e| fs_error::failed(path, e))?;
    Ok(true)
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    // Directory links on Windows are removed as directories
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// Create a symbolic link at `link` pointing at the relative `target`
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path, _target_is_dir: bool) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| fs_error::failed(link, e))
}

/// Create a symbolic link at `link` pointing at the relative `target`
#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path, target_is_dir: bool) -> Result<()> {
    let result = if target_is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|e| fs_error::failed(link, e))
}

/// Library files directly under `dir`, sorted by name
///
/// A missing directory has no libraries.
pub fn list_libraries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(fs_error::failed(dir, e)),
    };

    let glob = Glob::new(LIBRARY_PATTERN).map_err(|e| fs_error::failed(dir, e))?;

    let mut libraries = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| fs_error::failed(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if glob.matched(&CandidatePath::from(name.as_str())).is_some() {
            libraries.push(path);
        }
    }

    libraries.sort();
    Ok(libraries)
}
