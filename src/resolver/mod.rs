//! Version resolution against configured candidates
//!
//! [`VersionResolver`] picks exactly one concrete version (and its download
//! URI) out of a list of [`CandidateVersionSpec`]s:
//!
//! 1. Select the requested candidate by name, or the first one
//! 2. Keep the candidate's releases that satisfy any of its rules
//! 3. Choose the highest of those by numeric component comparison
//! 4. Check the component count when the subsystem requires one
//!
//! Resolution is a pure function of its inputs and never touches the
//! filesystem.

pub mod version;

use std::fmt;

use crate::config::CandidateVersionSpec;
use crate::error::{Result, resolution};

pub use version::{Version, VersionPattern};

/// Subsystem label used for the servlet container itself
pub const CONTAINER_SUBSYSTEM: &str = "container";

/// Number of components a container version must have
pub const CONTAINER_VERSION_ARITY: usize = 3;

/// A single concrete version paired with where to fetch it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Logical artifact name (e.g. "tomcat")
    pub name: String,
    /// Resolved version
    pub version: Version,
    /// Download URI for this version
    pub uri: String,
}

impl ResolvedVersion {
    /// Identity string exposed to the framework, e.g. `tomcat-7.0.42`
    pub fn id(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Resolves one concrete version out of a candidate list
#[derive(Debug, Clone)]
pub struct VersionResolver {
    subsystem: String,
    arity: Option<usize>,
    label_results: bool,
}

impl VersionResolver {
    /// Resolver for the servlet container: versions need exactly 3 components
    pub fn container() -> Self {
        Self {
            subsystem: CONTAINER_SUBSYSTEM.to_string(),
            arity: Some(CONTAINER_VERSION_ARITY),
            label_results: false,
        }
    }

    /// Resolver for the support library of a runtime
    ///
    /// The result is named `<runtime>-buildpack-support` whatever the
    /// candidate is called, and any version arity is accepted.
    pub fn support(runtime_name: &str) -> Self {
        Self {
            subsystem: support_label(runtime_name),
            arity: None,
            label_results: true,
        }
    }

    /// Pick the highest matching version from the requested (or first) candidate
    ///
    /// # Errors
    ///
    /// Returns a resolution error when the list is empty, the requested name
    /// is malformed or unknown, a rule or release does not parse, nothing
    /// matches, or the match has the wrong number of components.
    pub fn resolve(
        &self,
        candidates: &[CandidateVersionSpec],
        requested: Option<&str>,
    ) -> Result<ResolvedVersion> {
        let candidate = self.select(candidates, requested)?;

        let rules = candidate
            .rules
            .iter()
            .map(|rule| {
                VersionPattern::parse(rule).map_err(|reason| {
                    resolution::invalid_rule(&self.subsystem, &candidate.name, rule, reason)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut best: Option<Version> = None;
        for release in &candidate.releases {
            let version = Version::parse(release).map_err(|reason| {
                resolution::invalid_release(&self.subsystem, &candidate.name, release, reason)
            })?;

            if rules.iter().any(|rule| rule.matches(&version))
                && best.as_ref().is_none_or(|current| version > *current)
            {
                best = Some(version);
            }
        }

        let Some(version) = best else {
            return Err(resolution::no_matching_version(
                &self.subsystem,
                &candidate.name,
                candidate.rules.join(", "),
            ));
        };

        if let Some(expected) = self.arity {
            if version.arity() != expected {
                return Err(resolution::wrong_arity(
                    &self.subsystem,
                    &candidate.name,
                    version.to_string(),
                    expected,
                ));
            }
        }

        let name = if self.label_results || candidate.name.is_empty() {
            self.subsystem.clone()
        } else {
            candidate.name.clone()
        };

        Ok(ResolvedVersion {
            name,
            uri: candidate.uri_for(&version.to_string()),
            version,
        })
    }

    fn select<'a>(
        &self,
        candidates: &'a [CandidateVersionSpec],
        requested: Option<&str>,
    ) -> Result<&'a CandidateVersionSpec> {
        let Some(first) = candidates.first() else {
            return Err(resolution::no_candidates(&self.subsystem));
        };

        let Some(requested) = requested else {
            return Ok(first);
        };

        if !is_valid_name(requested) {
            return Err(resolution::malformed_request(&self.subsystem, requested));
        }

        candidates
            .iter()
            .find(|c| c.name == requested)
            .ok_or_else(|| {
                let available: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
                resolution::unknown_candidate(&self.subsystem, requested, &available)
            })
    }
}

/// Label of a runtime's support library, e.g. `tomcat-buildpack-support`
pub fn support_label(runtime_name: &str) -> String {
    format!("{runtime_name}-buildpack-support")
}

fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
