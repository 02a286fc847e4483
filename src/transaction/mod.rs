//! Transaction support for runtime staging
//!
//! This module ensures a failed compile never leaves behind a runtime that
//! `release` would accept.
//!
//! ## Usage
//!
//! ```ignore
//! let transaction = StagingTransaction::begin(&runtime_home)?;
//!
//! // Stage, install, link...
//!
//! // On success:
//! transaction.commit(&record)?;
//!
//! // On error (automatic via Drop if not committed):
//! // the runtime home is removed
//! ```
//!
//! A committed transaction leaves a marker file in the runtime home naming
//! what was staged. `release` checks it against the current resolution.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProvisionError, Result, fs as fs_error};

/// Marker file written into the runtime home on a successful compile
pub const STAGED_MARKER: &str = ".tomcat-provisioner.json";

/// What a successful compile staged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedRecord {
    /// Runtime identity, e.g. `tomcat-7.0.42`
    pub runtime: String,
    /// Support library identity, e.g. `tomcat-buildpack-support-1.1.1`
    pub support: String,
}

impl StagedRecord {
    /// Read the marker from a runtime home, if present
    pub fn read(runtime_home: &Path) -> Result<Option<Self>> {
        let path = runtime_home.join(STAGED_MARKER);
        match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| fs_error::failed(&path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(fs_error::failed(&path, e)),
        }
    }

    /// Fail unless the runtime home holds exactly this staged state
    pub fn verify(&self, runtime_home: &Path) -> Result<()> {
        let not_staged = || ProvisionError::RuntimeNotStaged {
            path: runtime_home.display().to_string(),
        };

        match Self::read(runtime_home) {
            Ok(Some(found)) if found == *self => Ok(()),
            Ok(Some(found)) => {
                debug!(
                    expected = ?self,
                    found = ?found,
                    "staged runtime does not match resolution"
                );
                Err(not_staged())
            }
            Ok(None) => Err(not_staged()),
            Err(e) => {
                debug!(error = %e, "unreadable staged marker");
                Err(not_staged())
            }
        }
    }

    fn write(&self, runtime_home: &Path) -> Result<()> {
        let path = runtime_home.join(STAGED_MARKER);
        let json = serde_json::to_string_pretty(self).map_err(|e| fs_error::failed(&path, e))?;
        fs::write(&path, json).map_err(|e| fs_error::failed(&path, e))
    }
}

/// A transaction around one compile of a runtime home
#[derive(Debug)]
pub struct StagingTransaction {
    /// Runtime home being staged
    runtime_home: PathBuf,

    /// Whether the transaction has been committed
    committed: bool,

    /// Whether rollback is enabled (can be disabled for testing)
    rollback_enabled: bool,
}

impl StagingTransaction {
    /// Start staging `runtime_home`, invalidating any previous marker
    pub fn begin(runtime_home: impl Into<PathBuf>) -> Result<Self> {
        let runtime_home = runtime_home.into();
        let marker = runtime_home.join(STAGED_MARKER);
        match fs::remove_file(&marker) {
            Ok(()) => debug!(path = %marker.display(), "invalidated staged marker"),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) => {}
            Err(e) => return Err(fs_error::failed(&marker, e)),
        }

        Ok(Self {
            runtime_home,
            committed: false,
            rollback_enabled: true,
        })
    }

    /// Disable automatic rollback on drop
    #[cfg(test)]
    pub fn without_rollback(mut self) -> Self {
        self.rollback_enabled = false;
        self
    }

    /// Commit the transaction, recording what was staged
    pub fn commit(mut self, record: &StagedRecord) -> Result<()> {
        record.write(&self.runtime_home)?;
        self.committed = true;
        Ok(())
    }

    /// Remove the partially staged runtime home
    pub fn rollback(&mut self) -> Result<()> {
        match fs::symlink_metadata(&self.runtime_home) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(&self.runtime_home)
                .map_err(|e| fs_error::failed(&self.runtime_home, e))?,
            Ok(_) => fs::remove_file(&self.runtime_home)
                .map_err(|e| fs_error::failed(&self.runtime_home, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(fs_error::failed(&self.runtime_home, e)),
        }
        warn!(path = %self.runtime_home.display(), "removed partially staged runtime");
        Ok(())
    }
}

impl Drop for StagingTransaction {
    fn drop(&mut self) {
        if !self.committed && self.rollback_enabled {
            // Automatic rollback on drop if not committed
            if let Err(e) = self.rollback() {
                warn!(error = %e, "rollback failed");
            }
        }
    }
}
