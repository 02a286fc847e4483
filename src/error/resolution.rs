//! Version resolution errors

use super::ProvisionError;

/// Creates an error for an empty candidate list
pub fn no_candidates(subsystem: impl Into<String>) -> ProvisionError {
    ProvisionError::NoCandidates {
        subsystem: subsystem.into(),
    }
}

/// Creates an error for a requested candidate name that cannot be valid
pub fn malformed_request(
    subsystem: impl Into<String>,
    requested: impl Into<String>,
) -> ProvisionError {
    ProvisionError::MalformedRequest {
        subsystem: subsystem.into(),
        requested: requested.into(),
    }
}

/// Creates an error for a requested candidate that is not configured
pub fn unknown_candidate(
    subsystem: impl Into<String>,
    requested: impl Into<String>,
    available: &[&str],
) -> ProvisionError {
    ProvisionError::UnknownCandidate {
        subsystem: subsystem.into(),
        requested: requested.into(),
        available: available.join(", "),
    }
}

/// Creates an error for a version rule that does not parse
pub fn invalid_rule(
    subsystem: impl Into<String>,
    candidate: impl Into<String>,
    rule: impl Into<String>,
    reason: impl Into<String>,
) -> ProvisionError {
    ProvisionError::InvalidVersionRule {
        subsystem: subsystem.into(),
        candidate: candidate.into(),
        rule: rule.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a listed release that is not a concrete version
pub fn invalid_release(
    subsystem: impl Into<String>,
    candidate: impl Into<String>,
    release: impl Into<String>,
    reason: impl Into<String>,
) -> ProvisionError {
    ProvisionError::InvalidRelease {
        subsystem: subsystem.into(),
        candidate: candidate.into(),
        release: release.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a candidate without any matching release
pub fn no_matching_version(
    subsystem: impl Into<String>,
    candidate: impl Into<String>,
    rules: impl Into<String>,
) -> ProvisionError {
    ProvisionError::NoMatchingVersion {
        subsystem: subsystem.into(),
        candidate: candidate.into(),
        rules: rules.into(),
    }
}

/// Creates an error for a resolved version with the wrong number of components
pub fn wrong_arity(
    subsystem: impl Into<String>,
    candidate: impl Into<String>,
    version: impl Into<String>,
    expected: usize,
) -> ProvisionError {
    ProvisionError::WrongVersionArity {
        subsystem: subsystem.into(),
        candidate: candidate.into(),
        version: version.into(),
        expected,
    }
}
