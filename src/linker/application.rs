//! Deployment of the application as the root context

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, fs as fs_error};
use crate::path_utils;

use super::{create_symlink, remove_entry};

/// Name of the single deployed unit
pub const ROOT_CONTEXT: &str = "ROOT";

/// Links the application root into the runtime's deployment directory
#[derive(Debug, Default, Clone, Copy)]
pub struct ApplicationLinker;

impl ApplicationLinker {
    /// Make `deployment_root/ROOT` a relative link to `app_dir`
    ///
    /// Anything already in `deployment_root` is removed first, whether a
    /// file, directory or link, so `ROOT` is the only entry afterwards.
    pub fn link(&self, app_dir: &Path, deployment_root: &Path) -> Result<PathBuf> {
        let is_dir = fs::symlink_metadata(deployment_root).is_ok_and(|m| m.is_dir());
        if is_dir {
            let entries =
                fs::read_dir(deployment_root).map_err(|e| fs_error::failed(deployment_root, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| fs_error::failed(deployment_root, e))?;
                remove_entry(&entry.path())?;
            }
        } else {
            remove_entry(deployment_root)?;
            fs::create_dir_all(deployment_root).map_err(|e| fs_error::failed(deployment_root, e))?;
        }

        let from = path_utils::normalize_existing(deployment_root)?;
        let to = path_utils::normalize_existing(app_dir)?;
        let target = path_utils::relative_path(&from, &to);

        let link = deployment_root.join(ROOT_CONTEXT);
        create_symlink(&target, &link, true)?;
        debug!(link = %link.display(), target = %target.display(), "linked application");

        Ok(link)
    }
}
