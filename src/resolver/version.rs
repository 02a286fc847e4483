//! Concrete versions and wildcard version patterns
//!
//! A [`Version`] is a dotted sequence of numeric components (`7.0.42`).
//! A [`VersionPattern`] is the same with an optional trailing `+`
//! wildcard (`7.0.+`) that stands for one or more components of any value.
//!
//! Versions order component-wise by numeric value, so `7.0.10 > 7.0.9`.

use std::cmp::Ordering;
use std::fmt;

/// Wildcard token accepted as the last component of a pattern
const WILDCARD: &str = "+";

/// A concrete dotted version number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    components: Vec<u64>,
    raw: String,
}

impl Version {
    /// Parse a concrete version, rejecting wildcards and non-numeric parts
    pub fn parse(input: &str) -> Result<Self, String> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err("version is empty".to_string());
        }

        let components = raw
            .split('.')
            .map(|part| parse_component(part, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            components,
            raw: raw.to_string(),
        })
    }

    /// Numeric components in order (major, minor, patch, ...)
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Number of components
    pub fn arity(&self) -> usize {
        self.components.len()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One component of a version pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternPart {
    Exact(u64),
    Wildcard,
}

/// A version matching rule such as `7.0.42`, `7.0.+` or `+`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPattern {
    parts: Vec<PatternPart>,
    raw: String,
}

impl VersionPattern {
    /// Parse a version rule; `+` is only valid as the final component
    pub fn parse(input: &str) -> Result<Self, String> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err("version rule is empty".to_string());
        }

        let tokens: Vec<&str> = raw.split('.').collect();
        let last = tokens.len() - 1;
        let mut parts = Vec::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            if *token == WILDCARD {
                if index != last {
                    return Err(format!("'{WILDCARD}' may only appear as the last component"));
                }
                parts.push(PatternPart::Wildcard);
            } else {
                parts.push(PatternPart::Exact(parse_component(token, raw)?));
            }
        }

        Ok(Self {
            parts,
            raw: raw.to_string(),
        })
    }

    /// Check whether a concrete version satisfies this rule
    pub fn matches(&self, version: &Version) -> bool {
        let components = version.components();

        match self.parts.last() {
            Some(PatternPart::Wildcard) => {
                let fixed = &self.parts[..self.parts.len() - 1];
                components.len() > fixed.len()
                    && fixed
                        .iter()
                        .zip(components)
                        .all(|(part, value)| *part == PatternPart::Exact(*value))
            }
            _ => {
                components.len() == self.parts.len()
                    && self
                        .parts
                        .iter()
                        .zip(components)
                        .all(|(part, value)| *part == PatternPart::Exact(*value))
            }
        }
    }
}

impl fmt::Display for VersionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_component(part: &str, whole: &str) -> Result<u64, String> {
    if part.is_empty() {
        return Err(format!("'{whole}' has an empty component"));
    }
    if !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{part}' is not a numeric component"));
    }
    part.parse::<u64>()
        .map_err(|e| format!("'{part}' is not a valid component: {e}"))
}
