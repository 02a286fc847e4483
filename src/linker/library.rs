//! Exposure of extra libraries inside `WEB-INF/lib`
//!
//! The library directory is additive: files the application ships itself
//! are never touched. Links left over from a previous run whose library
//! has since disappeared are pruned before new links are made.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, fs as fs_error};
use crate::path_utils;

use super::{create_symlink, list_libraries};

/// Links extra libraries into the deployed application's library directory
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryLinker;

impl LibraryLinker {
    /// Link every library in `extra_lib_dir` into `web_inf_lib`
    ///
    /// `extra_lib_dir` may be relative to `app_dir`. An absent or empty
    /// directory is not an error and changes nothing on disk. Returns the
    /// links created.
    pub fn link(
        &self,
        app_dir: &Path,
        extra_lib_dir: Option<&Path>,
        web_inf_lib: &Path,
    ) -> Result<Vec<PathBuf>> {
        let Some(extra_lib_dir) = extra_lib_dir else {
            debug!("no extra library directory declared");
            return Ok(Vec::new());
        };
        let extra_lib_dir = app_dir.join(extra_lib_dir);

        let libraries = list_libraries(&extra_lib_dir)?;
        if libraries.is_empty() {
            debug!(dir = %extra_lib_dir.display(), "no extra libraries to link");
            return Ok(Vec::new());
        }

        fs::create_dir_all(web_inf_lib).map_err(|e| fs_error::failed(web_inf_lib, e))?;

        let from = path_utils::normalize_existing(web_inf_lib)?;
        let source_dir = path_utils::normalize_existing(&extra_lib_dir)?;
        prune_stale_links(&from, &source_dir)?;

        let mut linked = Vec::with_capacity(libraries.len());
        for library in libraries {
            let Some(name) = library.file_name() else {
                continue;
            };
            let link = web_inf_lib.join(name);

            match fs::symlink_metadata(&link) {
                Ok(metadata) if metadata.file_type().is_symlink() => {
                    fs::remove_file(&link).map_err(|e| fs_error::failed(&link, e))?;
                }
                Ok(_) => {
                    warn!(
                        path = %link.display(),
                        "application already provides this library, not linking the extra copy"
                    );
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(fs_error::failed(&link, e)),
            }

            let target = path_utils::relative_path(&from, &source_dir.join(name));
            create_symlink(&target, &link, false)?;
            debug!(link = %link.display(), target = %target.display(), "linked library");
            linked.push(link);
        }

        Ok(linked)
    }
}

/// Remove links in `lib_dir` that point into `source_dir` at files that are gone
fn prune_stale_links(lib_dir: &Path, source_dir: &Path) -> Result<()> {
    let entries = fs::read_dir(lib_dir).map_err(|e| fs_error::failed(lib_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| fs_error::failed(lib_dir, e))?;
        let path = entry.path();
        let is_link = entry.file_type().is_ok_and(|t| t.is_symlink());
        if !is_link {
            continue;
        }

        let target = fs::read_link(&path).map_err(|e| fs_error::failed(&path, e))?;
        let resolved = path_utils::lexical_normalize(&lib_dir.join(target));
        if resolved.starts_with(source_dir) && !resolved.exists() {
            fs::remove_file(&path).map_err(|e| fs_error::failed(&path, e))?;
            debug!(link = %path.display(), "pruned stale library link");
        }
    }
    Ok(())
}
