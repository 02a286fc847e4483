use clap::Parser;
use std::path::PathBuf;

/// Arguments shared by detect, compile and release
#[derive(Parser, Debug, Clone)]
pub struct AppArgs {
    /// Application root directory
    pub app_dir: PathBuf,

    /// Container configuration file (defaults to the built-in one)
    #[arg(long, value_name = "FILE", env = "TOMCAT_PROVISIONER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Runtime candidate to use (defaults to the configured default)
    #[arg(long, value_name = "NAME", env = "TOMCAT_PROVISIONER_CONTAINER")]
    pub container: Option<String>,

    /// Java home, as it should appear in the launch command
    #[arg(long, value_name = "PATH", default_value = ".java")]
    pub java_home: PathBuf,

    /// JVM option, repeatable (e.g., --java-opt=-Xmx512m)
    #[arg(long = "java-opt", value_name = "OPT", allow_hyphen_values = true)]
    pub java_opts: Vec<String>,

    /// Extra library directory, relative to the application root
    #[arg(long, value_name = "DIR")]
    pub lib_dir: Option<PathBuf>,
}
