//! Cross-platform path utilities
//!
//! This module provides utilities for handling paths across different platforms
//! (Windows, macOS, Linux) with consistent behavior.

use std::path::{Component, Path, PathBuf};

use normpath::PathExt;

use crate::error::{Result, fs};

/// Characters that are unsafe in filesystem paths
/// Replaced with hyphens and collapsed: `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`
const PATH_UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Convert a path to a forward-slash string
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make an artifact name safe for filesystem use.
///
/// Replaces characters that are invalid on Windows or problematic in paths.
/// Collapses consecutive hyphens into a single hyphen and removes leading/trailing hyphens.
/// Returns "unknown" if the result is empty.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(make_path_safe("tomcat"), "tomcat");
/// assert_eq!(make_path_safe("org/tomcat:7"), "org-tomcat-7");
/// assert_eq!(make_path_safe(":::"), "unknown");
/// ```
pub fn make_path_safe(name: &str) -> String {
    let key: String = name
        .trim_start_matches('@')
        .chars()
        .map(|c| {
            if PATH_UNSAFE_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect();

    let key = key
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string();

    if key.is_empty() {
        "unknown".to_string()
    } else {
        key
    }
}

/// Resolve an existing path to its absolute, symlink-free form
///
/// Uses `normpath` so Windows verbatim prefixes are avoided.
pub fn normalize_existing(path: &Path) -> Result<PathBuf> {
    path.normalize()
        .map(|p| p.into_path_buf())
        .map_err(|e| fs::failed(path, e))
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Relative path that leads from directory `from` to `to`
///
/// Both paths should be absolute and normalized. When they share no
/// common root (e.g. different drives on Windows), `to` is returned as is.
///
/// ```text
/// relative_path("/app/.tomcat/webapps", "/app")              -> ../..
/// relative_path("/app/WEB-INF/lib", "/app/libs/a.jar")       -> ../../libs/a.jar
/// ```
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from_components: Vec<Component> = from.components().collect();
    let to_components: Vec<Component> = to.components().collect();

    let common = from_components
        .iter()
        .zip(&to_components)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return to.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..from_components.len() {
        relative.push("..");
    }
    for component in &to_components[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}
