//! Overlay resources copied over a staged runtime
//!
//! The built-in set is compiled into the binary:
//!
//! - `conf/server.xml`: HTTP connector bound to `${http.port}`
//! - `conf/context.xml`: allows symlinked application files
//! - `conf/logging.properties`: console-only logging
//!
//! A directory configured through `resources:` replaces the built-in set.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, config, fs as fs_error};
use crate::path_utils;

/// Built-in overlay files, keyed by their path relative to the runtime home
const BUILTIN: &[(&str, &[u8])] = &[
    (
        "conf/server.xml",
        include_bytes!("../../resources/tomcat/conf/server.xml"),
    ),
    (
        "conf/context.xml",
        include_bytes!("../../resources/tomcat/conf/context.xml"),
    ),
    (
        "conf/logging.properties",
        include_bytes!("../../resources/tomcat/conf/logging.properties"),
    ),
];

/// Contents of one overlay file
#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Embedded(&'static [u8]),
    File(PathBuf),
}

/// One overlay file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Path relative to the target directory
    pub path: PathBuf,
    content: Content,
}

impl Resource {
    fn bytes(&self) -> Result<Cow<'static, [u8]>> {
        match &self.content {
            Content::Embedded(bytes) => Ok(Cow::Borrowed(*bytes)),
            Content::File(source) => fs::read(source)
                .map(Cow::Owned)
                .map_err(|e| fs_error::failed(source, e)),
        }
    }
}

/// Fixed set of files overlaid onto a staged runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    /// The overlay shipped with the provisioner
    pub fn builtin() -> Self {
        Self {
            resources: BUILTIN
                .iter()
                .map(|(path, bytes)| Resource {
                    path: PathBuf::from(*path),
                    content: Content::Embedded(*bytes),
                })
                .collect(),
        }
    }

    /// Every regular file under `dir`, keyed by its path relative to `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(config::invalid(format!(
                "resources directory {} does not exist",
                dir.display()
            )));
        }

        let mut resources = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| fs_error::failed(dir, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| fs_error::failed(entry.path(), e))?;
            resources.push(Resource {
                path: relative.to_path_buf(),
                content: Content::File(entry.path().to_path_buf()),
            });
        }

        Ok(Self { resources })
    }

    /// The configured overlay directory, or the built-in set
    pub fn from_config(resources: Option<&Path>) -> Result<Self> {
        match resources {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::builtin()),
        }
    }

    /// Relative paths of the files in this set, in application order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.resources.iter().map(|r| r.path.as_path())
    }

    /// Copy every file into `target`, overwriting files at the same relative paths
    pub fn apply(&self, target: &Path) -> Result<usize> {
        for resource in &self.resources {
            let destination = target.join(&resource.path);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|e| fs_error::failed(parent, e))?;
            }
            // Replace links outright rather than writing through them
            if destination.is_symlink() {
                fs::remove_file(&destination).map_err(|e| fs_error::failed(&destination, e))?;
            }
            fs::write(&destination, resource.bytes()?)
                .map_err(|e| fs_error::failed(&destination, e))?;
            tracing::debug!(
                path = %path_utils::to_forward_slashes(&resource.path),
                "applied overlay resource"
            );
        }
        Ok(self.resources.len())
    }
}
