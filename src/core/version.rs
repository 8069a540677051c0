//! Recipe versions.
//!
//! A recipe version is either a numeric release (`1.12.1`) or a named
//! development branch (`master`). Releases are stored as semver versions so
//! they can be matched against dependency requirements; branches float and
//! are ordered after every release.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;

static BRANCH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9._/-]*$").unwrap());

/// A declared recipe version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecipeVersion {
    /// A numeric release, pinned by checksum.
    Release(Version),
    /// A named branch that tracks upstream.
    Branch(String),
}

impl RecipeVersion {
    /// Create a release version from its components.
    pub fn release(major: u64, minor: u64, patch: u64) -> Self {
        RecipeVersion::Release(Version::new(major, minor, patch))
    }

    /// Create a branch version.
    pub fn branch(name: impl Into<String>) -> Self {
        RecipeVersion::Branch(name.into())
    }

    /// The release version, if this is not a branch.
    pub fn as_release(&self) -> Option<&Version> {
        match self {
            RecipeVersion::Release(v) => Some(v),
            RecipeVersion::Branch(_) => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, RecipeVersion::Branch(_))
    }
}

impl FromStr for RecipeVersion {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(version) = parse_version_lenient(s) {
            return Ok(RecipeVersion::Release(version));
        }

        if BRANCH_NAME.is_match(s) {
            return Ok(RecipeVersion::Branch(s.to_string()));
        }

        Err(RecipeError::InvalidVersion {
            token: s.to_string(),
        })
    }
}

impl TryFrom<String> for RecipeVersion {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecipeVersion> for String {
    fn from(value: RecipeVersion) -> Self {
        value.to_string()
    }
}

impl From<Version> for RecipeVersion {
    fn from(value: Version) -> Self {
        RecipeVersion::Release(value)
    }
}

impl fmt::Display for RecipeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeVersion::Release(v) => write!(f, "{}", v),
            RecipeVersion::Branch(name) => f.write_str(name),
        }
    }
}

impl Ord for RecipeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RecipeVersion::Release(a), RecipeVersion::Release(b)) => a.cmp(b),
            (RecipeVersion::Release(_), RecipeVersion::Branch(_)) => Ordering::Less,
            (RecipeVersion::Branch(_), RecipeVersion::Release(_)) => Ordering::Greater,
            (RecipeVersion::Branch(a), RecipeVersion::Branch(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for RecipeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse a dotted numeric version of one to three components.
///
/// Upstream projects often zero-pad their components (`6.08`), which strict
/// semver rejects, so each component is parsed as a plain integer.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse::<Version>() {
        if v.pre.is_empty() && v.build.is_empty() {
            return Some(v);
        }
        return None;
    }

    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut nums = [0u64; 3];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }

    Some(Version::new(nums[0], nums[1], nums[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        let v: RecipeVersion = "1.12.1".parse().unwrap();
        assert_eq!(v, RecipeVersion::release(1, 12, 1));
        assert_eq!(v.to_string(), "1.12.1");
    }

    #[test]
    fn test_parse_lenient_components() {
        assert_eq!(parse_version_lenient("6.08"), Some(Version::new(6, 8, 0)));
        assert_eq!(parse_version_lenient("3"), Some(Version::new(3, 0, 0)));
        assert_eq!(parse_version_lenient("6.08.06"), Some(Version::new(6, 8, 6)));
        assert_eq!(parse_version_lenient("1.2.3.4"), None);
        assert_eq!(parse_version_lenient("1..2"), None);
    }

    #[test]
    fn test_parse_branch() {
        let v: RecipeVersion = "master".parse().unwrap();
        assert!(v.is_branch());
        assert_eq!(v.as_release(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1.x.3".parse::<RecipeVersion>().is_err());
        assert!("".parse::<RecipeVersion>().is_err());
        assert!("-dev".parse::<RecipeVersion>().is_err());
    }

    #[test]
    fn test_branch_sorts_after_releases() {
        let mut versions = vec![
            RecipeVersion::branch("master"),
            RecipeVersion::release(1, 10, 0),
            RecipeVersion::release(1, 12, 1),
            RecipeVersion::release(1, 11, 2),
        ];
        versions.sort();

        assert_eq!(versions[0], RecipeVersion::release(1, 10, 0));
        assert_eq!(versions[2], RecipeVersion::release(1, 12, 1));
        assert!(versions[3].is_branch());
    }

    #[test]
    fn test_serde_as_string() {
        let v: RecipeVersion = serde_json::from_str("\"1.11.0\"").unwrap();
        assert_eq!(v, RecipeVersion::release(1, 11, 0));
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.11.0\"");
    }
}
