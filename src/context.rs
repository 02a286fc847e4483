//! Provisioning context supplied by the enclosing framework
//!
//! Built once per detect/compile/release cycle through [`ContextBuilder`],
//! which checks required fields up front instead of failing at first use.

use std::path::{Path, PathBuf};

use crate::config::ContainerConfig;
use crate::error::{Result, config};

/// Directory whose presence marks a servlet application
pub const WEB_INF: &str = "WEB-INF";

/// External inputs for one provisioning run
#[derive(Debug, Clone)]
pub struct ProvisioningContext {
    /// Application root
    pub app_dir: PathBuf,
    /// Java home, as it should appear in the launch command
    pub java_home: PathBuf,
    /// JVM options, in order
    pub java_opts: Vec<String>,
    /// Application-supplied extra library directory, relative to `app_dir` or absolute
    pub lib_directory: Option<PathBuf>,
    /// Container configuration
    pub configuration: ContainerConfig,
}

impl ProvisioningContext {
    /// Start building a context
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Absolute path of the runtime home (e.g. `<app>/.tomcat`)
    pub fn runtime_home(&self) -> PathBuf {
        self.app_dir.join(&self.configuration.runtime_home)
    }

    /// Whether the application carries a `WEB-INF` directory at its root
    pub fn is_servlet_application(&self) -> bool {
        self.app_dir.join(WEB_INF).is_dir()
    }

    /// Extra library directory resolved against the application root
    pub fn extra_lib_dir(&self) -> Option<PathBuf> {
        self.lib_directory
            .as_deref()
            .map(|dir| resolve_against(&self.app_dir, dir))
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Builder for [`ProvisioningContext`]
#[derive(Debug, Default)]
pub struct ContextBuilder {
    app_dir: Option<PathBuf>,
    java_home: Option<PathBuf>,
    java_opts: Vec<String>,
    lib_directory: Option<PathBuf>,
    configuration: Option<ContainerConfig>,
}

impl ContextBuilder {
    /// Set the application root
    pub fn app_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_dir = Some(path.into());
        self
    }

    /// Set the Java home
    pub fn java_home(mut self, path: impl Into<PathBuf>) -> Self {
        self.java_home = Some(path.into());
        self
    }

    /// Set the JVM options
    pub fn java_opts<I, S>(mut self, opts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.java_opts = opts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the extra library directory
    pub fn lib_directory(mut self, path: Option<PathBuf>) -> Self {
        self.lib_directory = path;
        self
    }

    /// Set the container configuration
    pub fn configuration(mut self, configuration: ContainerConfig) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Validate and build the context
    ///
    /// # Errors
    ///
    /// Fails when the application root, Java home or configuration is
    /// missing, or the application root is not an existing directory.
    pub fn build(self) -> Result<ProvisioningContext> {
        let app_dir = self
            .app_dir
            .ok_or_else(|| config::invalid_context("application directory is required"))?;
        if !app_dir.is_dir() {
            return Err(config::invalid_context(format!(
                "application directory {} does not exist",
                app_dir.display()
            )));
        }

        let java_home = self
            .java_home
            .ok_or_else(|| config::invalid_context("java home is required"))?;
        if java_home.as_os_str().is_empty() {
            return Err(config::invalid_context("java home must not be empty"));
        }

        let configuration = self
            .configuration
            .ok_or_else(|| config::invalid_context("configuration is required"))?;

        Ok(ProvisioningContext {
            app_dir,
            java_home,
            java_opts: self.java_opts,
            lib_directory: self.lib_directory,
            configuration,
        })
    }
}
