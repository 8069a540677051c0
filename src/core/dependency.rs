//! Dependency declarations.
//!
//! A `DependencyDecl` describes what a recipe requires from another recipe:
//! a version requirement, variants the dependency must have, how the
//! dependency is used, and when the declaration applies at all.

use std::collections::BTreeSet;
use std::fmt;

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::core::condition::Condition;
use crate::core::variant::VariantValue;

/// How a dependency is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepType {
    /// Needed only while building (tools such as cmake).
    Build,
    /// Linked into the result.
    Link,
    /// Needed when the result runs.
    Run,
}

impl fmt::Display for DepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepType::Build => f.write_str("build"),
            DepType::Link => f.write_str("link"),
            DepType::Run => f.write_str("run"),
        }
    }
}

/// A dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    name: String,
    version_req: VersionReq,
    variants: Vec<(String, VariantValue)>,
    types: BTreeSet<DepType>,
    when: Condition,
    extends: bool,
}

impl DependencyDecl {
    /// Declare a build+link dependency on any version.
    pub fn new(name: impl Into<String>) -> Self {
        DependencyDecl {
            name: name.into(),
            version_req: VersionReq::STAR,
            variants: Vec::new(),
            types: [DepType::Build, DepType::Link].into_iter().collect(),
            when: Condition::Always,
            extends: false,
        }
    }

    /// Declare that the recipe extends an interpreter (installs into its
    /// module tree). Extensions are build, link and run dependencies.
    pub fn extension_of(name: impl Into<String>) -> Self {
        let mut dep = DependencyDecl::new(name);
        dep.types.insert(DepType::Run);
        dep.extends = true;
        dep
    }

    pub fn with_version_req(mut self, req: VersionReq) -> Self {
        self.version_req = req;
        self
    }

    /// Require a variant value on the dependency.
    pub fn with_variant(mut self, name: impl Into<String>, value: impl Into<VariantValue>) -> Self {
        self.variants.push((name.into(), value.into()));
        self
    }

    /// Replace the dependency types.
    pub fn with_types(mut self, types: &[DepType]) -> Self {
        self.types = types.iter().copied().collect();
        self
    }

    /// Restrict the declaration to packages matching `when`.
    pub fn when(mut self, when: Condition) -> Self {
        self.when = when;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }

    pub fn variants(&self) -> &[(String, VariantValue)] {
        &self.variants
    }

    pub fn types(&self) -> impl Iterator<Item = DepType> + '_ {
        self.types.iter().copied()
    }

    pub fn has_type(&self, ty: DepType) -> bool {
        self.types.contains(&ty)
    }

    /// Whether the dependency is needed only at build time.
    pub fn is_build_only(&self) -> bool {
        self.types.len() == 1 && self.has_type(DepType::Build)
    }

    pub fn condition(&self) -> &Condition {
        &self.when
    }

    pub fn is_extension(&self) -> bool {
        self.extends
    }

    /// Spec-style rendering, e.g. `root@>=6.8 +gdml +python`.
    pub fn constraint_string(&self) -> String {
        let mut s = self.name.clone();
        if self.version_req != VersionReq::STAR {
            s.push_str(&format!("@{}", self.version_req));
        }
        for (name, value) in &self.variants {
            match value {
                VariantValue::Bool(true) => s.push_str(&format!(" +{}", name)),
                VariantValue::Bool(false) => s.push_str(&format!(" ~{}", name)),
                VariantValue::Str(v) => s.push_str(&format!(" {}={}", name, v)),
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_types() {
        let dep = DependencyDecl::new("boost");
        assert!(dep.has_type(DepType::Build));
        assert!(dep.has_type(DepType::Link));
        assert!(!dep.has_type(DepType::Run));
        assert!(!dep.is_build_only());
        assert!(dep.condition().is_always());
    }

    #[test]
    fn test_build_only() {
        let dep = DependencyDecl::new("cmake")
            .with_version_req(">=3.12".parse().unwrap())
            .with_types(&[DepType::Build]);
        assert!(dep.is_build_only());
        assert_eq!(dep.constraint_string(), "cmake@>=3.12");
    }

    #[test]
    fn test_extension() {
        let dep = DependencyDecl::extension_of("python");
        assert!(dep.is_extension());
        assert_eq!(dep.types().collect::<Vec<_>>(), vec![DepType::Build, DepType::Link, DepType::Run]);
    }

    #[test]
    fn test_constraint_string_with_variants() {
        let dep = DependencyDecl::new("root")
            .with_version_req(">=6.8".parse().unwrap())
            .with_variant("gdml", true)
            .with_variant("cxxstd", "17");
        assert_eq!(dep.constraint_string(), "root@>=6.8 +gdml cxxstd=17");
    }
}
