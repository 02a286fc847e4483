//! Error types and handling for the provisioner
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`resolution`]: Version resolution errors
//! - [`download`]: Artifact download errors
//! - [`fs`]: File system and archive errors
//! - [`config`]: Configuration and context errors

#![allow(dead_code)]

pub mod config;
pub mod download;
pub mod fs;
pub mod resolution;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for provisioning operations
#[derive(Error, Diagnostic, Debug)]
pub enum ProvisionError {
    // Resolution errors
    #[error("No {subsystem} candidates are configured")]
    #[diagnostic(
        code(tomcat_provisioner::resolution::no_candidates),
        help("Add at least one candidate to the configuration")
    )]
    NoCandidates { subsystem: String },

    #[error("Malformed {subsystem} name requested: '{requested}'")]
    #[diagnostic(
        code(tomcat_provisioner::resolution::malformed_request),
        help("Candidate names may only contain letters, digits, '.', '_' and '-'")
    )]
    MalformedRequest { subsystem: String, requested: String },

    #[error("No {subsystem} candidate named '{requested}' (configured: {available})")]
    #[diagnostic(code(tomcat_provisioner::resolution::unknown_candidate))]
    UnknownCandidate {
        subsystem: String,
        requested: String,
        available: String,
    },

    #[error("Invalid version rule '{rule}' for {subsystem} candidate '{candidate}': {reason}")]
    #[diagnostic(
        code(tomcat_provisioner::resolution::invalid_rule),
        help("Version rules are dotted numbers, optionally ending in '+', e.g. 7.0.+")
    )]
    InvalidVersionRule {
        subsystem: String,
        candidate: String,
        rule: String,
        reason: String,
    },

    #[error("Invalid release '{release}' for {subsystem} candidate '{candidate}': {reason}")]
    #[diagnostic(code(tomcat_provisioner::resolution::invalid_release))]
    InvalidRelease {
        subsystem: String,
        candidate: String,
        release: String,
        reason: String,
    },

    #[error("No {subsystem} version of '{candidate}' matches {rules}")]
    #[diagnostic(
        code(tomcat_provisioner::resolution::no_match),
        help("Check the version rules and the releases listed for this candidate")
    )]
    NoMatchingVersion {
        subsystem: String,
        candidate: String,
        rules: String,
    },

    #[error(
        "Resolved {subsystem} version '{version}' of '{candidate}' must have exactly {expected} components"
    )]
    #[diagnostic(code(tomcat_provisioner::resolution::wrong_arity))]
    WrongVersionArity {
        subsystem: String,
        candidate: String,
        version: String,
        expected: usize,
    },

    // Download errors
    #[error("Failed to download {name} {version} from {uri}: {reason}")]
    #[diagnostic(
        code(tomcat_provisioner::download::failed),
        help("Check network access and that the URI is reachable")
    )]
    DownloadFailed {
        name: String,
        version: String,
        uri: String,
        reason: String,
    },

    // File system errors
    #[error("File system operation failed at {path}: {reason}")]
    #[diagnostic(code(tomcat_provisioner::fs::failed))]
    FilesystemFailed { path: String, reason: String },

    #[error("Failed to extract archive {archive}: {reason}")]
    #[diagnostic(code(tomcat_provisioner::archive::extraction_failed))]
    ExtractionFailed { archive: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(tomcat_provisioner::fs::io_error))]
    IoError { message: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(tomcat_provisioner::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration {path}: {reason}")]
    #[diagnostic(code(tomcat_provisioner::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(tomcat_provisioner::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Invalid provisioning context: {message}")]
    #[diagnostic(code(tomcat_provisioner::context::invalid))]
    ContextInvalid { message: String },

    // Container lifecycle errors
    #[error("Application at {path} does not need a servlet container")]
    #[diagnostic(
        code(tomcat_provisioner::container::not_applicable),
        help("A servlet application has a WEB-INF directory at its root")
    )]
    NotApplicable { path: String },

    #[error("No staged runtime found at {path}")]
    #[diagnostic(
        code(tomcat_provisioner::container::not_staged),
        help("Run 'tomcat-provisioner compile' before 'release'")
    )]
    RuntimeNotStaged { path: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(tomcat_provisioner::cache::operation_failed))]
    CacheOperationFailed { message: String },
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        ProvisionError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ProvisionError {
    fn from(err: serde_yaml::Error) -> Self {
        ProvisionError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ProvisionError>;
