//! Container configuration (tomcat.yml) data structures
//!
//! The configuration lists the runtime candidates the provisioner may
//! choose from plus a `support` section for the support library. A copy of
//! `config/tomcat.yml` is embedded in the binary and used when no file is
//! given.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{Result, config};

/// Embedded default configuration
pub const DEFAULT_CONFIG: &str = include_str!("../../config/tomcat.yml");

/// Default runtime home, relative to the application root
pub const DEFAULT_RUNTIME_HOME: &str = ".tomcat";

/// Default start script under `<runtime_home>/bin`
pub const DEFAULT_START_SCRIPT: &str = "catalina.sh";

/// Placeholder substituted with the resolved version in URI templates
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// A named, rule-based description of acceptable artifact versions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CandidateVersionSpec {
    /// Candidate name (e.g. "tomcat")
    #[serde(default)]
    pub name: String,

    /// Version matching rules (e.g. "7.0.+")
    #[serde(rename = "version", deserialize_with = "one_or_many")]
    pub rules: Vec<String>,

    /// Concrete versions available from the repository
    #[serde(default, deserialize_with = "version_strings")]
    pub releases: Vec<String>,

    /// URI template; `{version}` is replaced by the resolved version
    #[serde(rename = "uri")]
    pub uri_template: String,
}

impl CandidateVersionSpec {
    /// Create a candidate from its parts
    pub fn new(
        name: impl Into<String>,
        rules: &[&str],
        releases: &[&str],
        uri_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rules: rules.iter().map(|r| r.to_string()).collect(),
            releases: releases.iter().map(|r| r.to_string()).collect(),
            uri_template: uri_template.into(),
        }
    }

    /// Expand the URI template for a concrete version
    pub fn uri_for(&self, version: &str) -> String {
        self.uri_template.replace(VERSION_PLACEHOLDER, version)
    }
}

/// Raw document shape before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    runtime_home: Option<PathBuf>,
    #[serde(default)]
    start_script: Option<String>,
    #[serde(default)]
    resources: Option<PathBuf>,

    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "version", deserialize_with = "optional_one_or_many")]
    rules: Option<Vec<String>>,
    #[serde(default, deserialize_with = "version_strings")]
    releases: Vec<String>,
    #[serde(default)]
    uri: Option<String>,

    #[serde(default)]
    candidates: Vec<CandidateVersionSpec>,
    support: Option<CandidateVersionSpec>,
}

/// Validated container configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Runtime candidates, in declaration order
    pub candidates: Vec<CandidateVersionSpec>,
    /// Support library candidate
    pub support: CandidateVersionSpec,
    /// Candidate used when none is requested explicitly
    pub default: Option<String>,
    /// Runtime home relative to the application root
    pub runtime_home: PathBuf,
    /// Start script name under `<runtime_home>/bin`
    pub start_script: String,
    /// Overlay directory replacing the built-in resources
    pub resources: Option<PathBuf>,
}

impl ContainerConfig {
    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, "<embedded>")
    }

    /// Load configuration from a file, or the embedded default when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::from_yaml(DEFAULT_CONFIG);
        };

        if !path.is_file() {
            return Err(config::not_found(path.display().to_string()));
        }

        let yaml = fs::read_to_string(path)
            .map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))?;
        let mut loaded = Self::parse(&yaml, &path.display().to_string())?;

        // Overlay directories are relative to the file that names them
        if let (Some(resources), Some(base)) = (&loaded.resources, path.parent()) {
            if resources.is_relative() {
                loaded.resources = Some(base.join(resources));
            }
        }

        Ok(loaded)
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(yaml)
            .map_err(|e| config::parse_failed(origin, e.to_string()))?;

        let mut candidates = Vec::new();
        if let Some(name) = raw.name {
            let uri_template = raw
                .uri
                .ok_or_else(|| config::invalid(format!("candidate '{name}' has no uri")))?;
            candidates.push(CandidateVersionSpec {
                name,
                rules: raw.rules.unwrap_or_default(),
                releases: raw.releases,
                uri_template,
            });
        }
        candidates.extend(raw.candidates);

        let support = raw
            .support
            .ok_or_else(|| config::invalid("missing 'support' section"))?;

        let loaded = Self {
            candidates,
            support,
            default: raw.default,
            runtime_home: raw
                .runtime_home
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNTIME_HOME)),
            start_script: raw
                .start_script
                .unwrap_or_else(|| DEFAULT_START_SCRIPT.to_string()),
            resources: raw.resources,
        };
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.name.trim().is_empty() {
                return Err(config::invalid("runtime candidate without a name"));
            }
            if !seen.insert(candidate.name.as_str()) {
                return Err(config::invalid(format!(
                    "duplicate runtime candidate '{}'",
                    candidate.name
                )));
            }
            validate_candidate(candidate, &candidate.name)?;
        }

        validate_candidate(&self.support, "support")?;

        if !is_nested_relative(&self.runtime_home) {
            return Err(config::invalid(format!(
                "runtime_home '{}' must be a relative path below the application root",
                self.runtime_home.display()
            )));
        }
        if self.start_script.trim().is_empty() {
            return Err(config::invalid("start_script must not be empty"));
        }

        Ok(())
    }
}

fn validate_candidate(candidate: &CandidateVersionSpec, label: &str) -> Result<()> {
    if candidate.uri_template.trim().is_empty() {
        return Err(config::invalid(format!("candidate '{label}' has an empty uri")));
    }
    if candidate.rules.is_empty() {
        return Err(config::invalid(format!(
            "candidate '{label}' has no version rules"
        )));
    }
    Ok(())
}

/// Whether `path` names a directory strictly below the one it is joined to
fn is_nested_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// A YAML scalar that may have been written as a number
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl Scalar {
    /// Source text of the scalar; non-integer numbers lose their spelling
    /// (`1.10` parses as `1.1`) and are rejected
    fn into_text<E: serde::de::Error>(self) -> std::result::Result<String, E> {
        match self {
            Scalar::Text(s) => Ok(s),
            Scalar::Integer(n) => Ok(n.to_string()),
            Scalar::Float(f) => Err(E::custom(format!(
                "version near {f} is a fractional YAML number and loses its spelling \
                 (1.10 reads as 1.1); quote it to keep it as written"
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl OneOrMany {
    fn into_texts<E: serde::de::Error>(self) -> std::result::Result<Vec<String>, E> {
        match self {
            OneOrMany::One(s) => Ok(vec![s.into_text()?]),
            OneOrMany::Many(list) => list.into_iter().map(Scalar::into_text).collect(),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::deserialize(deserializer)?.into_texts()
}

fn optional_one_or_many<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<OneOrMany>::deserialize(deserializer)?
        .map(OneOrMany::into_texts)
        .transpose()
}

fn version_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Scalar>::deserialize(deserializer)?
        .into_iter()
        .map(Scalar::into_text)
        .collect()
}
