//! Archive extraction with leading-component stripping and exclusions
//!
//! Runtime distributions wrap their contents in one top-level directory
//! (`apache-tomcat-7.0.42/`). Extraction drops that directory and skips the
//! excluded subpaths so the overlay owns them.
//!
//! Both gzip-compressed and plain tar archives are accepted; compression is
//! detected from the file's magic bytes rather than its name, since cached
//! payloads carry no meaningful extension.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::debug;

use crate::error::{Result, fs as fs_error};
use crate::path_utils;

/// gzip magic number
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// What an extraction did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Entries written to the target
    pub extracted: usize,
    /// Entries skipped because they fall under an excluded path
    pub excluded: usize,
}

/// Extraction rules
#[derive(Debug, Clone)]
pub struct ExtractOptions<'a> {
    /// Leading path components removed from every entry
    pub strip_components: usize,
    /// Paths (after stripping) that are never extracted, along with
    /// everything beneath them
    pub exclusions: &'a [&'a str],
}

/// Extract `archive` into `target`
///
/// # Errors
///
/// Returns [`crate::error::ProvisionError::ExtractionFailed`] when the
/// archive is unreadable or contains entries escaping `target`, either by
/// their own path, through a symlink they create, or through a symlink an
/// earlier entry created.
pub fn extract(
    archive: &Path,
    target: &Path,
    options: &ExtractOptions<'_>,
) -> Result<ExtractSummary> {
    let failed = |reason: String| fs_error::extraction_failed(archive, reason);
    let root = path_utils::normalize_existing(target)?;

    let file = File::open(archive).map_err(|e| failed(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let compressed = reader
        .fill_buf()
        .map(|head| head.starts_with(&GZIP_MAGIC))
        .map_err(|e| failed(e.to_string()))?;

    let stream: Box<dyn Read> = if compressed {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };

    let mut tarball = Archive::new(stream);
    tarball.set_preserve_permissions(true);
    tarball.set_preserve_mtime(true);
    tarball.set_overwrite(true);

    let mut summary = ExtractSummary::default();
    for entry in tarball.entries().map_err(|e| failed(e.to_string()))? {
        let mut entry = entry.map_err(|e| failed(e.to_string()))?;
        let entry_type = entry.header().entry_type();
        if is_metadata(entry_type) {
            continue;
        }

        let original = entry.path().map_err(|e| failed(e.to_string()))?.into_owned();
        let Some(relative) = strip(&original, options.strip_components).map_err(&failed)? else {
            continue;
        };

        if is_excluded(&relative, options.exclusions) {
            debug!(path = %relative.display(), "excluded from extraction");
            summary.excluded += 1;
            continue;
        }

        let destination = root.join(&relative);
        ensure_within(&root, &destination).map_err(&failed)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error::failed(parent, e))?;
        }

        if entry_type.is_hard_link() {
            let link = entry
                .link_name()
                .map_err(|e| failed(e.to_string()))?
                .ok_or_else(|| failed(format!("hard link {} has no target", original.display())))?;
            let Some(link_relative) = strip(&link, options.strip_components).map_err(&failed)?
            else {
                return Err(failed(format!(
                    "hard link {} has an empty target",
                    original.display()
                )));
            };
            let source = root.join(link_relative);
            ensure_within(&root, &source).map_err(&failed)?;
            if destination.symlink_metadata().is_ok() {
                fs::remove_file(&destination).map_err(|e| fs_error::failed(&destination, e))?;
            }
            fs::hard_link(&source, &destination).map_err(|e| fs_error::failed(&destination, e))?;
        } else {
            if entry_type.is_symlink() {
                let link = entry
                    .link_name()
                    .map_err(|e| failed(e.to_string()))?
                    .ok_or_else(|| {
                        failed(format!("symlink {} has no target", original.display()))
                    })?;
                ensure_link_within(&root, &destination, &link).map_err(&failed)?;
            }
            entry
                .unpack(&destination)
                .map_err(|e| failed(format!("{}: {e}", original.display())))?;
        }
        summary.extracted += 1;
    }

    Ok(summary)
}

fn is_metadata(entry_type: EntryType) -> bool {
    entry_type.is_pax_global_extensions()
        || entry_type.is_pax_local_extensions()
        || entry_type.is_gnu_longname()
        || entry_type.is_gnu_longlink()
}

/// Drop `count` leading components, rejecting paths that could escape the target
///
/// Returns `None` for entries that vanish entirely (the wrapper directory).
fn strip(path: &Path, count: usize) -> std::result::Result<Option<PathBuf>, String> {
    let mut kept = PathBuf::new();
    let mut skipped = 0;
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                if skipped < count {
                    skipped += 1;
                } else {
                    kept.push(part);
                }
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(format!("entry {} escapes the target directory", path.display()));
            }
        }
    }

    Ok((!kept.as_os_str().is_empty()).then_some(kept))
}

/// Reject `destination` when its nearest existing ancestor resolves outside
/// `root`, which happens once an earlier entry planted a symlink on the way
fn ensure_within(root: &Path, destination: &Path) -> std::result::Result<(), String> {
    let inside = destination
        .ancestors()
        .skip(1)
        .find(|dir| dir.symlink_metadata().is_ok())
        .and_then(|dir| path_utils::normalize_existing(dir).ok())
        .is_some_and(|resolved| resolved.starts_with(root));

    if inside {
        Ok(())
    } else {
        Err(format!("entry {} escapes the target directory", destination.display()))
    }
}

/// Reject symlinks that are absolute or point above `root`
fn ensure_link_within(
    root: &Path,
    destination: &Path,
    link: &Path,
) -> std::result::Result<(), String> {
    let escapes = || {
        format!(
            "symlink {} -> {} escapes the target directory",
            destination.display(),
            link.display()
        )
    };
    if link.has_root() || link.is_absolute() {
        return Err(escapes());
    }

    let parent = destination
        .parent()
        .and_then(|dir| path_utils::normalize_existing(dir).ok())
        .ok_or_else(escapes)?;
    if path_utils::lexical_normalize(&parent.join(link)).starts_with(root) {
        Ok(())
    } else {
        Err(escapes())
    }
}

fn is_excluded(relative: &Path, exclusions: &[&str]) -> bool {
    exclusions.iter().any(|excluded| relative.starts_with(excluded))
}
