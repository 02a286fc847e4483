//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides helper functions to create common test environments
//! (temp directories, runtime archives, a stub artifact cache) with a single
//! function call.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{StubCache, create_temp_dir, write_tarball};
//!
//! #[test]
//! fn my_test() {
//!     let temp = create_temp_dir();
//!     let archive = temp.path().join("tomcat.tar.gz");
//!     write_tarball(&archive, "apache-tomcat-7.0.42", &[("bin/catalina.sh", "#!/bin/sh")]);
//!
//!     let cache = StubCache::new().with("tomcat", &archive);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::cache::ArtifactCache;
use crate::config::{CandidateVersionSpec, ContainerConfig};
use crate::error::{Result, download};
use crate::resolver::{ResolvedVersion, Version};

/// Fixed modification time for archive entries
const ARCHIVE_MTIME: u64 = 1_700_000_000;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Configuration with one `tomcat` candidate and a support library
///
/// Resolves to `tomcat-7.0.42` and `tomcat-buildpack-support-1.1.1`.
#[must_use]
pub fn test_config(uri_base: &str) -> ContainerConfig {
    let config = ContainerConfig {
        candidates: vec![CandidateVersionSpec::new(
            "tomcat",
            &["7.0.+"],
            &["7.0.40", "7.0.41", "7.0.42", "8.0.1"],
            format!("{uri_base}/apache-tomcat-{{version}}.tar.gz"),
        )],
        support: CandidateVersionSpec::new(
            "support",
            &["1.+"],
            &["1.0.0", "1.1.0", "1.1.1"],
            format!("{uri_base}/tomcat-buildpack-support-{{version}}.jar"),
        ),
        default: None,
        runtime_home: PathBuf::from(crate::config::DEFAULT_RUNTIME_HOME),
        start_script: crate::config::DEFAULT_START_SCRIPT.to_string(),
        resources: None,
    };
    config.validate().expect("test configuration should be valid");
    config
}

/// A resolved version, for tests that skip resolution
///
/// # Panics
///
/// Panics if `version` does not parse.
#[must_use]
pub fn resolved_version(name: &str, version: &str, uri: &str) -> ResolvedVersion {
    ResolvedVersion {
        name: name.to_string(),
        version: Version::parse(version).expect("test version should parse"),
        uri: uri.to_string(),
    }
}

/// Write a gzip-compressed tarball with every file wrapped in `wrapper/`
///
/// Shell scripts are marked executable; all entries share one mtime so
/// repeated extractions produce identical trees.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_tarball(path: &Path, wrapper: &str, files: &[(&str, &str)]) {
    let file = File::create(path).expect("Failed to create archive");
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    header.set_mtime(ARCHIVE_MTIME);
    builder
        .append_data(&mut header, format!("{wrapper}/"), io::empty())
        .expect("Failed to append wrapper directory");

    for (name, contents) in files {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(if name.ends_with(".sh") { 0o755 } else { 0o644 });
        header.set_mtime(ARCHIVE_MTIME);
        builder
            .append_data(&mut header, format!("{wrapper}/{name}"), contents.as_bytes())
            .expect("Failed to append archive entry");
    }

    builder
        .into_inner()
        .expect("Failed to finish archive")
        .finish()
        .expect("Failed to finish compression");
}

/// One node of a directory snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
    Link(PathBuf),
}

/// Every path under `root` with its contents, without following links
///
/// # Panics
///
/// Panics if the tree cannot be read.
#[must_use]
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Node> {
    let mut snapshot = BTreeMap::new();
    for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
        let entry = entry.expect("Failed to walk tree");
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("entry under root")
            .to_path_buf();
        let file_type = entry.file_type();
        let node = if file_type.is_symlink() {
            Node::Link(fs::read_link(entry.path()).expect("Failed to read link"))
        } else if file_type.is_dir() {
            Node::Dir
        } else {
            Node::File(fs::read(entry.path()).expect("Failed to read file"))
        };
        snapshot.insert(relative, node);
    }
    snapshot
}

/// In-memory [`ArtifactCache`] serving local files by artifact name
#[derive(Debug, Default)]
pub struct StubCache {
    artifacts: HashMap<String, PathBuf>,
}

impl StubCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `path` for every version of `name`
    #[must_use]
    pub fn with(mut self, name: &str, path: &Path) -> Self {
        self.artifacts.insert(name.to_string(), path.to_path_buf());
        self
    }
}

impl ArtifactCache for StubCache {
    fn fetch(&self, name: &str, resolved: &ResolvedVersion) -> Result<PathBuf> {
        self.artifacts
            .get(name)
            .filter(|path| path.is_file())
            .cloned()
            .ok_or_else(|| {
                download::failed(
                    name,
                    resolved.version.to_string(),
                    &resolved.uri,
                    "not available",
                )
            })
    }
}
