//! Common test utilities for provisioner integration tests

#![allow(dead_code)]

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;

/// Environment variables that would leak host settings into a test run
const HOST_ENV: &[&str] = &[
    "TOMCAT_PROVISIONER_CONFIG",
    "TOMCAT_PROVISIONER_CONTAINER",
    "TOMCAT_PROVISIONER_LOG",
];

/// Contents of the support library jar served by the test repository
pub const SUPPORT_JAR: &str = "support-jar-bytes";

/// A temporary application, artifact repository and download cache
pub struct TestApp {
    /// Temporary directory holding everything below
    pub temp: TempDir,
    /// Application root
    pub app: PathBuf,
    /// Directory the configured artifact URIs point into
    pub repository: PathBuf,
    /// Download cache root
    pub cache: PathBuf,
    /// Container configuration file
    pub config: PathBuf,
}

impl TestApp {
    /// Create a servlet application with a local artifact repository
    pub fn new() -> Self {
        let test_app = Self::without_web_inf();
        fs::create_dir_all(test_app.app.join("WEB-INF")).expect("Failed to create WEB-INF");
        test_app
    }

    /// Create an application without a `WEB-INF` directory
    pub fn without_web_inf() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let app = temp.path().join("app");
        let repository = temp.path().join("repository");
        let cache = temp.path().join("cache");
        fs::create_dir_all(&app).expect("Failed to create application directory");
        fs::create_dir_all(&repository).expect("Failed to create repository");

        write_runtime_archive(&repository.join("apache-tomcat-7.0.42.tar.gz"));
        fs::write(
            repository.join("tomcat-buildpack-support-1.1.1.jar"),
            SUPPORT_JAR,
        )
        .expect("Failed to write support jar");

        let config = temp.path().join("tomcat.yml");
        let test_app = Self {
            temp,
            app,
            repository,
            cache,
            config,
        };
        test_app.write_config("");
        test_app
    }

    /// Write the configuration, appending `extra` top-level YAML
    pub fn write_config(&self, extra: &str) {
        let repository = self.repository.display();
        let yaml = format!(
            r"default: tomcat
candidates:
  - name: tomcat
    version: 7.0.+
    releases: ['7.0.40', '7.0.41', '7.0.42', '8.0.1']
    uri: '{repository}/apache-tomcat-{{version}}.tar.gz'
support:
  version: 1.+
  releases: ['1.0.0', '1.1.0', '1.1.1']
  uri: '{repository}/tomcat-buildpack-support-{{version}}.jar'
{extra}"
        );
        fs::write(&self.config, yaml).expect("Failed to write config");
    }

    /// Provisioner command bound to this application's config and cache
    pub fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = Command::cargo_bin("tomcat-provisioner").expect("Failed to find binary");
        for var in HOST_ENV {
            cmd.env_remove(var);
        }
        cmd.env("TOMCAT_PROVISIONER_CACHE_DIR", &self.cache)
            .arg(subcommand)
            .arg(&self.app)
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    /// Command for subcommands that do not take an application
    pub fn cache_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tomcat-provisioner").expect("Failed to find binary");
        cmd.env("TOMCAT_PROVISIONER_CACHE_DIR", &self.cache)
            .arg("cache");
        cmd
    }

    /// Write a file below the temp root, creating parents
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.temp.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Staged runtime home
    pub fn runtime_home(&self) -> PathBuf {
        self.app.join(".tomcat")
    }
}

/// Tomcat-shaped archive wrapped in `apache-tomcat-7.0.42/`
pub fn write_runtime_archive(path: &Path) {
    let files: &[(&str, &str)] = &[
        ("bin/catalina.sh", "#!/bin/sh\necho catalina\n"),
        ("lib/catalina.jar", "catalina-jar"),
        ("conf/server.xml", "<Server archive='true'/>"),
        ("conf/context.xml", "<Context archive='true'/>"),
        ("conf/web.xml", "<web-app/>"),
        ("webapps/ROOT/index.html", "<html/>"),
        ("webapps/docs/index.html", "<html/>"),
    ];

    let file = File::create(path).expect("Failed to create archive");
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    builder
        .append_data(&mut header, "apache-tomcat-7.0.42/", io::empty())
        .expect("Failed to append wrapper directory");

    for (name, contents) in files {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(if name.ends_with(".sh") { 0o755 } else { 0o644 });
        builder
            .append_data(
                &mut header,
                format!("apache-tomcat-7.0.42/{name}"),
                contents.as_bytes(),
            )
            .expect("Failed to append archive entry");
    }

    builder
        .into_inner()
        .expect("Failed to finish archive")
        .finish()
        .expect("Failed to finish compression");
}
