//! Spec conformance checks.
//!
//! The resolver is responsible for producing a spec that satisfies a recipe's
//! declarations. This module reports where a given spec falls short, which is
//! useful when a spec is produced by an external resolver or written by hand.

use std::fmt;

use pubgrub::Range;
use semver::VersionReq;
use serde::Serialize;

use crate::core::range::intersect_reqs;
use crate::core::{DependencyDecl, Recipe, RecipeError, RecipeVersion, ResolvedSpec, VariantValue};

/// A declared constraint the spec does not meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConformanceIssue {
    /// The root version is not one the recipe declares.
    UndeclaredVersion { version: String },
    /// The root sets a variant the recipe does not declare.
    UnknownVariant { variant: String },
    /// The root sets a variant to a value it does not accept.
    InvalidVariantValue { variant: String, value: String },
    /// An active dependency has no node in the spec.
    MissingDependency { dependency: String, constraint: String },
    /// The dependency node exists but the root does not depend on it.
    NotLinked { dependency: String },
    /// Active requirements on one dependency cannot all hold.
    ConflictingRequirements {
        dependency: String,
        requirements: Vec<String>,
    },
    /// The dependency's version is outside its requirement.
    VersionMismatch {
        dependency: String,
        version: String,
        requirement: String,
    },
    /// A required variant of the dependency is not set as declared.
    VariantMismatch {
        dependency: String,
        variant: String,
        expected: String,
        found: Option<String>,
    },
}

impl fmt::Display for ConformanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConformanceIssue::UndeclaredVersion { version } => {
                write!(f, "version `{}` is not declared by the recipe", version)
            }
            ConformanceIssue::UnknownVariant { variant } => {
                write!(f, "variant `{}` is not declared by the recipe", variant)
            }
            ConformanceIssue::InvalidVariantValue { variant, value } => {
                write!(f, "variant `{}` does not accept `{}`", variant, value)
            }
            ConformanceIssue::MissingDependency {
                dependency,
                constraint,
            } => write!(f, "`{}` is required ({}) but not in the spec", dependency, constraint),
            ConformanceIssue::NotLinked { dependency } => {
                write!(f, "`{}` is in the spec but the root does not depend on it", dependency)
            }
            ConformanceIssue::ConflictingRequirements {
                dependency,
                requirements,
            } => write!(
                f,
                "requirements on `{}` cannot all hold: {}",
                dependency,
                requirements.join(", ")
            ),
            ConformanceIssue::VersionMismatch {
                dependency,
                version,
                requirement,
            } => write!(f, "`{}@{}` does not satisfy `{}`", dependency, version, requirement),
            ConformanceIssue::VariantMismatch {
                dependency,
                variant,
                expected,
                found,
            } => write!(
                f,
                "`{}` needs {}={} but has {}",
                dependency,
                variant,
                expected,
                found.as_deref().unwrap_or("it unset")
            ),
        }
    }
}

/// Check `spec` against the declarations of `recipe`.
///
/// Issues are reported in a stable order: root checks first, then
/// dependencies in declaration order.
pub fn check_spec(recipe: &Recipe, spec: &ResolvedSpec) -> Result<Vec<ConformanceIssue>, RecipeError> {
    let bound = recipe.bind(spec)?;
    let root = bound.node();
    let mut issues = Vec::new();

    if recipe.version_entry(&root.version).is_err() {
        issues.push(ConformanceIssue::UndeclaredVersion {
            version: root.version.to_string(),
        });
    }

    for (name, value) in &root.variants {
        match recipe.variant(name) {
            None => issues.push(ConformanceIssue::UnknownVariant {
                variant: name.clone(),
            }),
            Some(variant) if !variant.accepts(value) => {
                issues.push(ConformanceIssue::InvalidVariantValue {
                    variant: name.clone(),
                    value: value.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    for (name, decls) in group_by_name(recipe.dependencies_for(&bound)) {
        check_dependency(spec, name, &decls, &mut issues);
    }

    tracing::debug!(
        "Conformance of {} against {}: {} issue(s)",
        spec.root_name(),
        recipe.name(),
        issues.len()
    );

    Ok(issues)
}

fn check_dependency(
    spec: &ResolvedSpec,
    name: &str,
    decls: &[&DependencyDecl],
    issues: &mut Vec<ConformanceIssue>,
) {
    let reqs: Vec<&VersionReq> = decls
        .iter()
        .map(|d| d.version_req())
        .filter(|r| **r != VersionReq::STAR)
        .collect();
    let range = intersect_reqs(reqs.iter().copied());
    let requirement = reqs
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    if range == Range::empty() {
        issues.push(ConformanceIssue::ConflictingRequirements {
            dependency: name.to_string(),
            requirements: reqs.iter().map(|r| r.to_string()).collect(),
        });
        return;
    }

    let Some(node) = spec.node(name) else {
        issues.push(ConformanceIssue::MissingDependency {
            dependency: name.to_string(),
            constraint: decls
                .iter()
                .map(|d| d.constraint_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
        return;
    };

    if !spec.root().dependencies.iter().any(|d| d == name) {
        issues.push(ConformanceIssue::NotLinked {
            dependency: name.to_string(),
        });
    }

    let version_ok = match &node.version {
        RecipeVersion::Release(v) => range.contains(v),
        // A floating branch can only satisfy an unconstrained requirement.
        RecipeVersion::Branch(_) => reqs.is_empty(),
    };
    if !version_ok {
        issues.push(ConformanceIssue::VersionMismatch {
            dependency: name.to_string(),
            version: node.version.to_string(),
            requirement,
        });
    }

    for decl in decls {
        for (variant, expected) in decl.variants() {
            let found = node.variant_value(variant);
            if found != Some(expected) {
                issues.push(ConformanceIssue::VariantMismatch {
                    dependency: name.to_string(),
                    variant: variant.clone(),
                    expected: expected.to_string(),
                    found: found.map(VariantValue::to_string),
                });
            }
        }
    }
}

/// Group declarations by dependency name, keeping first-seen order.
fn group_by_name<'a>(
    decls: impl Iterator<Item = &'a DependencyDecl>,
) -> Vec<(&'a str, Vec<&'a DependencyDecl>)> {
    let mut groups: Vec<(&str, Vec<&DependencyDecl>)> = Vec::new();
    for decl in decls {
        match groups.iter_mut().find(|(name, _)| *name == decl.name()) {
            Some((_, list)) => list.push(decl),
            None => groups.push((decl.name(), vec![decl])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, SpecNode, Variant, VersionEntry};
    use crate::recipes::dd4hep;

    fn dd4hep_spec(root_variants: &[(&str, bool)], root_version: (u64, u64, u64)) -> Vec<SpecNode> {
        let (major, minor, patch) = root_version;
        let mut root = SpecNode::new("dd4hep", RecipeVersion::release(major, minor, patch), "/opt/dd4hep");
        for dep in ["cmake", "boost", "root", "python"] {
            root = root.with_dependency(dep);
        }
        for (name, value) in root_variants {
            root = root.with_variant(*name, *value);
        }

        let mut cern_root = SpecNode::new("root", RecipeVersion::release(6, 20, 4), "/opt/root")
            .with_variant("cxxstd", "17");
        for v in ["gdml", "math", "opengl", "python", "x"] {
            cern_root = cern_root.with_variant(v, true);
        }

        vec![
            root,
            SpecNode::new("cmake", RecipeVersion::release(3, 17, 3), "/opt/cmake"),
            SpecNode::new("boost", RecipeVersion::release(1, 72, 0), "/opt/boost"),
            cern_root,
            SpecNode::new("python", RecipeVersion::release(3, 8, 5), "/opt/python"),
        ]
    }

    #[test]
    fn test_conforming_spec() {
        let recipe = dd4hep::recipe().unwrap();
        let spec = ResolvedSpec::new("dd4hep", dd4hep_spec(&[], (1, 12, 1))).unwrap();

        assert_eq!(check_spec(&recipe, &spec).unwrap(), vec![]);
    }

    #[test]
    fn test_conditional_dependency_missing() {
        let recipe = dd4hep::recipe().unwrap();
        let spec = ResolvedSpec::new("dd4hep", dd4hep_spec(&[("geant4", true)], (1, 12, 1))).unwrap();

        let issues = check_spec(&recipe, &spec).unwrap();
        assert_eq!(
            issues,
            vec![ConformanceIssue::MissingDependency {
                dependency: "geant4".into(),
                constraint: "geant4@>=10.2.2".into(),
            }]
        );
    }

    #[test]
    fn test_root_version_and_variant_issues() {
        let recipe = dd4hep::recipe().unwrap();
        let spec = ResolvedSpec::new("dd4hep", dd4hep_spec(&[("opencl", true)], (1, 9, 0))).unwrap();

        let issues = check_spec(&recipe, &spec).unwrap();
        assert!(issues.contains(&ConformanceIssue::UndeclaredVersion {
            version: "1.9.0".into()
        }));
        assert!(issues.contains(&ConformanceIssue::UnknownVariant {
            variant: "opencl".into()
        }));
    }

    #[test]
    fn test_dependency_version_and_variant_mismatch() {
        let recipe = dd4hep::recipe().unwrap();
        let nodes = dd4hep_spec(&[], (1, 12, 1)).into_iter().map(|n| {
            let name = n.name.clone();
            match name.as_str() {
                "boost" => SpecNode::new("boost", RecipeVersion::release(1, 48, 0), "/opt/boost"),
                "root" => n.with_variant("gdml", false),
                _ => n,
            }
        });
        let spec = ResolvedSpec::new("dd4hep", nodes.collect::<Vec<_>>()).unwrap();

        let issues = check_spec(&recipe, &spec).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].to_string(),
            "`boost@1.48.0` does not satisfy `>=1.49`"
        );
        assert_eq!(issues[1].to_string(), "`root` needs gdml=true but has false");
    }

    #[test]
    fn test_conflicting_requirements() {
        let recipe = Recipe::builder("app")
            .git(url::Url::parse("https://example.org/app.git").unwrap())
            .version(VersionEntry::branch("main"))
            .variant(Variant::toggle("new", true, "new api"))
            .depends_on(DependencyDecl::new("lib").with_version_req(">=2".parse().unwrap()))
            .depends_on(
                DependencyDecl::new("lib")
                    .with_version_req("<1.5".parse().unwrap())
                    .when(Condition::enabled("new")),
            )
            .build()
            .unwrap();
        let spec = ResolvedSpec::new(
            "app",
            vec![SpecNode::new("app", RecipeVersion::branch("main"), "/opt/app")],
        )
        .unwrap();

        let issues = check_spec(&recipe, &spec).unwrap();
        assert!(matches!(
            &issues[..],
            [ConformanceIssue::ConflictingRequirements { dependency, .. }] if dependency == "lib"
        ));
    }

    #[test]
    fn test_not_linked() {
        let recipe = dd4hep::recipe().unwrap();
        let nodes = dd4hep_spec(&[], (1, 12, 1)).into_iter().map(|mut n| {
            if n.name == "dd4hep" {
                n.dependencies.retain(|d| d != "cmake");
            }
            n
        });
        let spec = ResolvedSpec::new("dd4hep", nodes.collect::<Vec<_>>()).unwrap();

        assert_eq!(
            check_spec(&recipe, &spec).unwrap(),
            vec![ConformanceIssue::NotLinked {
                dependency: "cmake".into()
            }]
        );
    }
}
