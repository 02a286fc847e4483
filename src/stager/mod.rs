//! Staging of a runtime distribution into its home directory
//!
//! Every call rebuilds the target from scratch:
//!
//! 1. obtain the archive from the [`ArtifactCache`]
//! 2. remove whatever is at the target
//! 3. recreate the target as an empty directory
//! 4. extract, stripping the wrapper directory and skipping [`EXCLUDED_PATHS`]
//! 5. apply the overlay [`ResourceSet`]
//!
//! The download happens before anything is removed, so when [`stage`]
//! fails to download it returns with the target as it found it. `compile`
//! runs staging inside a [`StagingTransaction`], whose rollback then removes
//! the target anyway: after any failed compile there is no runtime home.
//!
//! [`stage`]: ArtifactStager::stage
//! [`StagingTransaction`]: crate::transaction::StagingTransaction

pub mod extract;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cache::ArtifactCache;
use crate::error::{Result, fs as fs_error};
use crate::resolver::ResolvedVersion;
use crate::resource::ResourceSet;

pub use extract::{ExtractOptions, ExtractSummary};

/// Deployment directory of the runtime
pub const DEPLOYMENT_DIR: &str = "webapps";

/// Library directory of the runtime
pub const LIB_DIR: &str = "lib";

/// Archive paths never extracted, so operator-supplied files survive
pub const EXCLUDED_PATHS: &[&str] = &[DEPLOYMENT_DIR, "conf/server.xml", "conf/context.xml"];

/// Leading archive components removed during extraction
pub const STRIP_COMPONENTS: usize = 1;

/// Materializes a runtime archive at a target directory
pub struct ArtifactStager<'a> {
    cache: &'a dyn ArtifactCache,
}

impl<'a> ArtifactStager<'a> {
    /// Create a stager fetching through `cache`
    pub fn new(cache: &'a dyn ArtifactCache) -> Self {
        Self { cache }
    }

    /// Replace the contents of `target` with the staged artifact
    ///
    /// # Errors
    ///
    /// Download, extraction and file system failures are all fatal and
    /// carry their underlying cause.
    pub fn stage(
        &self,
        resolved: &ResolvedVersion,
        target: &Path,
        overlay: &ResourceSet,
    ) -> Result<ExtractSummary> {
        let archive = self.cache.fetch(&resolved.name, resolved)?;

        reset_dir(target)?;

        let summary = extract::extract(
            &archive,
            target,
            &ExtractOptions {
                strip_components: STRIP_COMPONENTS,
                exclusions: EXCLUDED_PATHS,
            },
        )?;

        let applied = overlay.apply(target)?;
        debug!(
            target = %target.display(),
            extracted = summary.extracted,
            excluded = summary.excluded,
            overlay = applied,
            "staged {resolved}"
        );

        Ok(summary)
    }
}

/// Remove anything at `dir` and recreate it empty
fn reset_dir(dir: &Path) -> Result<()> {
    match fs::symlink_metadata(dir) {
        Ok(metadata) if metadata.is_dir() => {
            fs::remove_dir_all(dir).map_err(|e| fs_error::failed(dir, e))?;
        }
        Ok(_) => fs::remove_file(dir).map_err(|e| fs_error::failed(dir, e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(fs_error::failed(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| fs_error::failed(dir, e))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::test_fixtures::{
        StubCache, create_temp_dir, resolved_version, snapshot_tree, write_tarball,
    };

    const ARCHIVE_FILES: &[(&str, &str)] = &[
        ("bin/catalina.sh", "#!/bin/sh\nexec java\n"),
        ("conf/web.xml", "<web-app/>"),
        ("conf/server.xml", "<Server upstream='true'/>"),
        ("conf/context.xml", "<Context upstream='true'/>"),
        ("webapps/docs/index.html", "upstream docs"),
        ("webapps/ROOT/index.jsp", "upstream root"),
        ("lib/catalina.jar", "catalina"),
    ];

    fn stub_with_archive(temp: &Path) -> (StubCache, ResolvedVersion) {
        let archive = temp.join("apache-tomcat-7.0.42.tar.gz");
        write_tarball(&archive, "apache-tomcat-7.0.42", ARCHIVE_FILES);
        let resolved = resolved_version("tomcat", "7.0.42", &archive.display().to_string());
        let cache = StubCache::new().with("tomcat", &archive);
        (cache, resolved)
    }

    #[test]
    fn test_stage_extracts_and_overlays() {
        let temp = create_temp_dir();
        let (cache, resolved) = stub_with_archive(temp.path());
        let target = temp.path().join("app/.tomcat");

        ArtifactStager::new(&cache)
            .stage(&resolved, &target, &ResourceSet::builtin())
            .expect("stage");

        assert!(target.join("bin/catalina.sh").is_file());
        assert!(target.join("lib/catalina.jar").is_file());
        assert!(!target.join(DEPLOYMENT_DIR).exists());

        let overlay = create_temp_dir();
        ResourceSet::builtin().apply(overlay.path()).expect("apply");
        for path in ["conf/server.xml", "conf/context.xml"] {
            assert_eq!(
                fs::read(target.join(path)).expect("staged"),
                fs::read(overlay.path().join(path)).expect("overlay"),
                "{path} should come from the overlay"
            );
        }
    }

    #[test]
    fn test_stage_removes_residue() {
        let temp = create_temp_dir();
        let (cache, resolved) = stub_with_archive(temp.path());
        let target = temp.path().join("app/.tomcat");
        fs::create_dir_all(target.join("work/Catalina")).expect("create residue");
        fs::write(target.join("work/Catalina/stale.class"), "stale").expect("write residue");

        ArtifactStager::new(&cache)
            .stage(&resolved, &target, &ResourceSet::builtin())
            .expect("stage");

        assert!(!target.join("work").exists());
    }

    #[test]
    fn test_stage_twice_is_identical() {
        let temp = create_temp_dir();
        let (cache, resolved) = stub_with_archive(temp.path());
        let target = temp.path().join("app/.tomcat");
        let stager = ArtifactStager::new(&cache);

        stager
            .stage(&resolved, &target, &ResourceSet::builtin())
            .expect("first stage");
        let first = snapshot_tree(&target);
        stager
            .stage(&resolved, &target, &ResourceSet::builtin())
            .expect("second stage");

        assert_eq!(first, snapshot_tree(&target));
    }

    #[test]
    fn test_download_failure_leaves_target_untouched() {
        let temp = create_temp_dir();
        let target = temp.path().join("app/.tomcat");
        fs::create_dir_all(&target).expect("create target");
        fs::write(target.join("marker"), "previous").expect("write marker");

        let cache = StubCache::new();
        let resolved = resolved_version("tomcat", "7.0.42", "https://unreachable/t.tar.gz");
        let err = ArtifactStager::new(&cache)
            .stage(&resolved, &target, &ResourceSet::builtin())
            .expect_err("download fails");

        assert!(matches!(err, ProvisionError::DownloadFailed { .. }));
        assert!(target.join("marker").is_file());
    }

    #[test]
    fn test_reset_replaces_file_with_directory() {
        let temp = create_temp_dir();
        let target = temp.path().join(".tomcat");
        fs::write(&target, "not a directory").expect("write file");

        reset_dir(&target).expect("reset");
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).expect("read").count(), 0);
    }
}
