//! Launch command and release descriptor

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path_utils;

/// JVM option binding the HTTP connector to the platform-assigned port
pub const HTTP_PORT_OPT: &str = "-Dhttp.port=$PORT";

/// Process type the launch command is registered under
pub const WEB_PROCESS: &str = "web";

/// Command starting the runtime in the foreground
///
/// ```text
/// JAVA_HOME=.java JAVA_OPTS="-Xmx512m -Dhttp.port=$PORT" .tomcat/bin/catalina.sh run
/// ```
pub fn launch_command(
    java_home: &Path,
    java_opts: &[String],
    runtime_home: &Path,
    start_script: &str,
) -> String {
    format!(
        "JAVA_HOME={} JAVA_OPTS=\"{}\" {}/bin/{} run",
        path_utils::to_forward_slashes(java_home),
        java_opts.join(" "),
        path_utils::to_forward_slashes(runtime_home),
        start_script
    )
}

/// Release document handed back to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Add-on services to provision
    pub addons: Vec<String>,
    /// Environment for every process
    pub config_vars: BTreeMap<String, String>,
    /// Commands by process type
    pub default_process_types: BTreeMap<String, String>,
}

impl ReleaseDescriptor {
    /// Descriptor running `command` as the web process
    pub fn web(command: impl Into<String>) -> Self {
        Self {
            addons: Vec::new(),
            config_vars: BTreeMap::new(),
            default_process_types: BTreeMap::from([(WEB_PROCESS.to_string(), command.into())]),
        }
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_command() {
        let command = launch_command(
            Path::new(".java"),
            &["-Xmx512m".to_string(), HTTP_PORT_OPT.to_string()],
            Path::new(".tomcat"),
            "catalina.sh",
        );
        assert_eq!(
            command,
            "JAVA_HOME=.java JAVA_OPTS=\"-Xmx512m -Dhttp.port=$PORT\" .tomcat/bin/catalina.sh run"
        );
    }

    #[test]
    fn test_descriptor_yaml_parses_back() {
        let descriptor = ReleaseDescriptor::web(
            "JAVA_HOME=.java JAVA_OPTS=\"-Dhttp.port=$PORT\" .tomcat/bin/catalina.sh run",
        );
        let yaml = descriptor.to_yaml().expect("render");

        assert!(yaml.contains("addons: []"));
        assert!(yaml.contains("config_vars: {}"));

        let parsed: ReleaseDescriptor = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(parsed, descriptor);
        assert_eq!(
            parsed.default_process_types.get(WEB_PROCESS).map(String::as_str),
            Some("JAVA_HOME=.java JAVA_OPTS=\"-Dhttp.port=$PORT\" .tomcat/bin/catalina.sh run")
        );
    }
}
