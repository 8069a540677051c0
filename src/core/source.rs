//! Fetch strategies - WHERE a recipe version comes from.
//!
//! Release versions are fetched as archives and pinned by checksum. Branch
//! versions are tracked from source control and are never pinned.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::version::RecipeVersion;

/// A sha256 digest, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Checksum {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match hex::decode(s) {
            Ok(bytes) if bytes.len() == 32 => Ok(Checksum(s.to_ascii_lowercase())),
            _ => Err(RecipeError::InvalidChecksum {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Checksum {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        value.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A git reference to check out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitReference {
    /// Specific branch
    Branch(String),
    /// Specific tag
    Tag(String),
    /// Specific revision (commit hash)
    Rev(String),
}

impl GitReference {
    /// Whether the reference can move upstream.
    pub fn is_mutable(&self) -> bool {
        matches!(self, GitReference::Branch(_))
    }
}

impl fmt::Display for GitReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitReference::Branch(b) => write!(f, "branch={}", b),
            GitReference::Tag(t) => write!(f, "tag={}", t),
            GitReference::Rev(r) => write!(f, "rev={}", r),
        }
    }
}

/// How a declared version is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Immutable archive, URL computed by the recipe.
    Archive { sha256: Checksum },
    /// Source-control checkout from the recipe's git URL.
    Git { reference: GitReference },
}

/// A declared version together with its fetch strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: RecipeVersion,
    pub fetch: FetchStrategy,
}

impl VersionEntry {
    /// A release pinned by sha256.
    pub fn archive(version: RecipeVersion, sha256: &str) -> Result<Self, RecipeError> {
        Ok(VersionEntry {
            version,
            fetch: FetchStrategy::Archive {
                sha256: sha256.parse()?,
            },
        })
    }

    /// A version tracking a git branch.
    pub fn branch(name: &str) -> Self {
        VersionEntry {
            version: RecipeVersion::branch(name),
            fetch: FetchStrategy::Git {
                reference: GitReference::Branch(name.to_string()),
            },
        }
    }
}

/// A fully resolved fetch source handed to the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchSource {
    /// Download `url` and verify it against `sha256`.
    Archive { url: String, sha256: Checksum },
    /// Check out `reference` from `url`.
    Git { url: String, reference: GitReference },
}

impl FetchSource {
    /// The location the fetch layer reads from.
    pub fn url(&self) -> &str {
        match self {
            FetchSource::Archive { url, .. } | FetchSource::Git { url, .. } => url,
        }
    }

    /// Whether the fetched content is pinned.
    pub fn is_pinned(&self) -> bool {
        match self {
            FetchSource::Archive { .. } => true,
            FetchSource::Git { reference, .. } => !reference.is_mutable(),
        }
    }
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchSource::Archive { url, sha256 } => write!(f, "{} (sha256={})", url, sha256),
            FetchSource::Git { url, reference } => write!(f, "git {} ({})", url, reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "85e8c775ec03c499ce10911e228342e757c81ce9ef2a9195cb253b85175a2e93";

    #[test]
    fn test_checksum_accepts_sha256() {
        let sum: Checksum = SHA.parse().unwrap();
        assert_eq!(sum.as_str(), SHA);

        let upper: Checksum = SHA.to_uppercase().parse().unwrap();
        assert_eq!(upper, sum);
    }

    #[test]
    fn test_checksum_rejects_bad_input() {
        assert!("abc123".parse::<Checksum>().is_err());
        assert!(SHA.replace('e', "z").parse::<Checksum>().is_err());
        assert!(format!("{}00", SHA).parse::<Checksum>().is_err());
    }

    #[test]
    fn test_branch_entry_is_unpinned() {
        let entry = VersionEntry::branch("master");
        let source = FetchSource::Git {
            url: "https://example.org/repo.git".into(),
            reference: match entry.fetch {
                FetchStrategy::Git { reference } => reference,
                FetchStrategy::Archive { .. } => unreachable!(),
            },
        };
        assert!(!source.is_pinned());
        assert_eq!(source.to_string(), "git https://example.org/repo.git (branch=master)");
    }
}
