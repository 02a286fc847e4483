//! Servlet container lifecycle: detect, compile, release
//!
//! Versions are resolved once, when the container is created, and only for
//! applications carrying a `WEB-INF` directory. The runtime and its support
//! library resolve together or not at all.
//!
//! Compile runs the staging steps in a fixed order, each relying on the
//! file system state left by the one before:
//!
//! 1. [`ArtifactStager`] expands the runtime into the runtime home
//! 2. [`SupportLibraryInstaller`] drops the support JAR into its `lib`
//! 3. [`ApplicationLinker`] deploys the application as `webapps/ROOT`
//! 4. [`LibraryLinker`] exposes extra libraries in `WEB-INF/lib`

pub mod release;

use tracing::{debug, info};

use crate::cache::ArtifactCache;
use crate::context::{ProvisioningContext, WEB_INF};
use crate::error::{ProvisionError, Result};
use crate::installer::SupportLibraryInstaller;
use crate::linker::{ApplicationLinker, LibraryLinker};
use crate::path_utils;
use crate::progress;
use crate::resolver::{ResolvedVersion, VersionResolver};
use crate::resource::ResourceSet;
use crate::stager::{ArtifactStager, DEPLOYMENT_DIR, LIB_DIR};
use crate::transaction::{StagedRecord, StagingTransaction};

pub use release::{HTTP_PORT_OPT, ReleaseDescriptor, launch_command};

/// Library directory of a deployed application, under `WEB-INF`
const WEB_INF_LIB: &str = "lib";

/// Versions resolved for an applicable application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// The servlet container
    pub runtime: ResolvedVersion,
    /// Its support library
    pub support: ResolvedVersion,
}

impl Detection {
    /// Identity strings, e.g. `tomcat-7.0.42` and `tomcat-buildpack-support-1.1.1`
    pub fn ids(&self) -> Vec<String> {
        vec![self.runtime.id(), self.support.id()]
    }

    fn record(&self) -> StagedRecord {
        StagedRecord {
            runtime: self.runtime.id(),
            support: self.support.id(),
        }
    }
}

/// Provisions a servlet container for one application
pub struct TomcatContainer<'a> {
    context: &'a mut ProvisioningContext,
    cache: &'a dyn ArtifactCache,
    detected: Option<Detection>,
}

impl<'a> TomcatContainer<'a> {
    /// Create the container, resolving versions when the application needs one
    ///
    /// `requested` names a runtime candidate; without it the configured
    /// default (or the first candidate) is used.
    ///
    /// # Errors
    ///
    /// Resolution errors surface here, before anything touches the disk.
    pub fn new(
        context: &'a mut ProvisioningContext,
        cache: &'a dyn ArtifactCache,
        requested: Option<&str>,
    ) -> Result<Self> {
        let detected = if context.is_servlet_application() {
            let config = &context.configuration;
            let requested = requested.or(config.default.as_deref());
            let runtime = VersionResolver::container().resolve(&config.candidates, requested)?;
            let support = VersionResolver::support(&runtime.name)
                .resolve(std::slice::from_ref(&config.support), None)?;
            debug!(runtime = %runtime, support = %support, "resolved versions");
            Some(Detection { runtime, support })
        } else {
            debug!(app = %context.app_dir.display(), "no {WEB_INF} directory");
            None
        };

        Ok(Self {
            context,
            cache,
            detected,
        })
    }

    /// Identity strings, or `None` when not applicable
    pub fn detect(&self) -> Option<Vec<String>> {
        self.detected.as_ref().map(Detection::ids)
    }

    /// Stage the runtime, support library and links
    ///
    /// A failure removes the partially staged runtime home.
    pub fn compile(&self) -> Result<()> {
        let detection = self.applicable()?;
        let config = &self.context.configuration;
        let app_dir = &self.context.app_dir;
        let runtime_home = self.context.runtime_home();
        let overlay = ResourceSet::from_config(config.resources.as_deref())?;
        debug!(resources = ?overlay.paths().collect::<Vec<_>>(), "overlay loaded");

        let transaction = StagingTransaction::begin(&runtime_home)?;

        let label = format!(
            "Expanding {} {} to {}",
            display_name(&detection.runtime.name),
            detection.runtime.version,
            path_utils::to_forward_slashes(&config.runtime_home)
        );
        progress::timed(label, || {
            ArtifactStager::new(self.cache).stage(&detection.runtime, &runtime_home, &overlay)
        })?;

        SupportLibraryInstaller::new(self.cache)
            .install(&detection.support, &runtime_home.join(LIB_DIR))?;

        let root = ApplicationLinker.link(app_dir, &runtime_home.join(DEPLOYMENT_DIR))?;

        let linked = LibraryLinker.link(
            app_dir,
            self.context.extra_lib_dir().as_deref(),
            &root.join(WEB_INF).join(WEB_INF_LIB),
        )?;

        transaction.commit(&detection.record())?;
        info!(
            runtime = %detection.runtime,
            support = %detection.support,
            libraries = linked.len(),
            "compiled"
        );
        Ok(())
    }

    /// Launch command for the staged runtime
    ///
    /// Appends the HTTP port option to the context's JVM options.
    ///
    /// # Errors
    ///
    /// Fails with [`ProvisionError::RuntimeNotStaged`] unless a successful
    /// compile of the same versions is on disk.
    pub fn release(&mut self) -> Result<String> {
        let record = self.applicable()?.record();
        record.verify(&self.context.runtime_home())?;

        if !self.context.java_opts.iter().any(|opt| opt == HTTP_PORT_OPT) {
            self.context.java_opts.push(HTTP_PORT_OPT.to_string());
        }

        let config = &self.context.configuration;
        Ok(launch_command(
            &self.context.java_home,
            &self.context.java_opts,
            &config.runtime_home,
            &config.start_script,
        ))
    }

    fn applicable(&self) -> Result<&Detection> {
        self.detected
            .as_ref()
            .ok_or_else(|| ProvisionError::NotApplicable {
                path: self.context.app_dir.display().to_string(),
            })
    }
}

/// `tomcat` becomes `Tomcat`
fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::{StubCache, create_temp_dir, test_config, write_tarball};
    use std::fs;
    use std::path::{Path, PathBuf};

    struct Fixture {
        _temp: tempfile::TempDir,
        root: PathBuf,
        app: PathBuf,
        cache: StubCache,
    }

    /// An application plus a stub cache serving a runtime archive and support jar
    fn fixture(servlet: bool) -> Fixture {
        let temp = create_temp_dir();
        let root = path_utils::normalize_existing(temp.path()).expect("normalize");
        let app = root.join("app");
        fs::create_dir_all(&app).expect("create app");
        if servlet {
            fs::create_dir_all(app.join("WEB-INF")).expect("create WEB-INF");
            fs::write(app.join("WEB-INF/web.xml"), "<web-app/>").expect("write web.xml");
        }

        let archive = root.join("tomcat.tar.gz");
        write_tarball(
            &archive,
            "apache-tomcat-7.0.42",
            &[
                ("bin/catalina.sh", "#!/bin/sh\n"),
                ("conf/server.xml", "<Server upstream='true'/>"),
                ("webapps/ROOT/index.jsp", "upstream"),
            ],
        );
        let jar = root.join("support.jar");
        fs::write(&jar, "support").expect("write jar");

        let cache = StubCache::new()
            .with("tomcat", &archive)
            .with("tomcat-buildpack-support", &jar);
        Fixture {
            _temp: temp,
            root,
            app,
            cache,
        }
    }

    fn context(app: &Path, lib_directory: Option<&str>) -> ProvisioningContext {
        ProvisioningContext::builder()
            .app_dir(app)
            .java_home(".java")
            .java_opts(["-Xmx512m"])
            .lib_directory(lib_directory.map(PathBuf::from))
            .configuration(test_config("file:///repository"))
            .build()
            .expect("context")
    }

    #[test]
    fn test_detect_servlet_application() {
        let fixture = fixture(true);
        let mut context = context(&fixture.app, None);
        let container =
            TomcatContainer::new(&mut context, &fixture.cache, None).expect("container");

        assert_eq!(
            container.detect(),
            Some(vec![
                "tomcat-7.0.42".to_string(),
                "tomcat-buildpack-support-1.1.1".to_string()
            ])
        );
    }

    #[test]
    fn test_detect_without_web_inf() {
        let fixture = fixture(false);
        let mut context = context(&fixture.app, None);
        let container =
            TomcatContainer::new(&mut context, &fixture.cache, None).expect("container");

        assert_eq!(container.detect(), None);
        let err = container.compile().expect_err("not applicable");
        assert!(matches!(err, ProvisionError::NotApplicable { .. }));
        assert!(!fixture.app.join(".tomcat").exists());
    }

    #[test]
    fn test_requested_candidate_must_exist() {
        let fixture = fixture(true);
        let mut context = context(&fixture.app, None);
        let result = TomcatContainer::new(&mut context, &fixture.cache, Some("jetty"));
        assert!(matches!(result, Err(ProvisionError::UnknownCandidate { .. })));
    }

    #[test]
    fn test_compile_stages_runtime() {
        let fixture = fixture(true);
        fs::create_dir_all(fixture.app.join("libs")).expect("create libs");
        fs::write(fixture.app.join("libs/a.jar"), "a").expect("write a.jar");
        let mut context = context(&fixture.app, Some("libs"));
        let container =
            TomcatContainer::new(&mut context, &fixture.cache, None).expect("container");

        container.compile().expect("compile");

        let home = fixture.app.join(".tomcat");
        assert!(home.join("bin/catalina.sh").is_file());
        assert!(home.join("lib/tomcat-buildpack-support-1.1.1.jar").is_file());

        let root = home.join("webapps/ROOT");
        assert!(root.symlink_metadata().expect("ROOT").file_type().is_symlink());
        assert_eq!(path_utils::normalize_existing(&root).expect("resolve"), fixture.app);

        let library = root.join("WEB-INF/lib/a.jar");
        assert!(library.symlink_metadata().expect("a.jar").file_type().is_symlink());
        assert_eq!(
            path_utils::normalize_existing(&library).expect("resolve"),
            fixture.app.join("libs/a.jar")
        );

        let server = fs::read_to_string(home.join("conf/server.xml")).expect("server.xml");
        assert!(server.contains("${http.port}"));
    }

    #[test]
    fn test_failed_compile_leaves_no_runtime() {
        let fixture = fixture(true);
        let mut context = context(&fixture.app, None);
        let cache = StubCache::new().with("tomcat", &fixture.root.join("tomcat.tar.gz"));
        let container = TomcatContainer::new(&mut context, &cache, None).expect("container");

        let err = container.compile().expect_err("support jar missing");
        assert!(matches!(err, ProvisionError::DownloadFailed { .. }));
        assert!(!fixture.app.join(".tomcat").exists());
    }

    #[test]
    fn test_release_after_compile() {
        let fixture = fixture(true);
        let mut context = context(&fixture.app, None);
        {
            let mut container =
                TomcatContainer::new(&mut context, &fixture.cache, None).expect("container");
            container.compile().expect("compile");
            let command = container.release().expect("release");
            assert_eq!(
                command,
                "JAVA_HOME=.java JAVA_OPTS=\"-Xmx512m -Dhttp.port=$PORT\" .tomcat/bin/catalina.sh run"
            );
            container.release().expect("release again");
        }
        assert_eq!(context.java_opts, vec!["-Xmx512m", HTTP_PORT_OPT]);
    }

    #[test]
    fn test_release_requires_compile() {
        let fixture = fixture(true);
        let mut context = context(&fixture.app, None);
        let mut container =
            TomcatContainer::new(&mut context, &fixture.cache, None).expect("container");

        let err = container.release().expect_err("not staged");
        assert!(matches!(err, ProvisionError::RuntimeNotStaged { .. }));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("tomcat"), "Tomcat");
        assert_eq!(display_name(""), "");
    }
}
