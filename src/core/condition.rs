//! Applicability conditions.
//!
//! A `Condition` decides whether a patch or dependency declaration applies to
//! a concrete package. Conditions are plain data evaluated against anything
//! that exposes a version and variant values.

use std::fmt;

use semver::VersionReq;

use crate::core::variant::VariantValue;
use crate::core::version::RecipeVersion;

/// Something a condition can be evaluated against.
pub trait Subject {
    /// The concrete version.
    fn version(&self) -> &RecipeVersion;

    /// The effective value of a variant, if known.
    fn variant(&self, name: &str) -> Option<VariantValue>;
}

/// A bare version with no variant information.
impl Subject for RecipeVersion {
    fn version(&self) -> &RecipeVersion {
        self
    }

    fn variant(&self, _name: &str) -> Option<VariantValue> {
        None
    }
}

/// Predicate over a concrete package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Always,
    /// Release version matches the requirement. Branches never match.
    Version(VersionReq),
    /// Version is exactly this one.
    VersionEq(RecipeVersion),
    /// Variant has this value.
    Variant { name: String, value: VariantValue },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Shorthand for `+name`.
    pub fn enabled(name: impl Into<String>) -> Self {
        Condition::Variant {
            name: name.into(),
            value: VariantValue::Bool(true),
        }
    }

    /// Shorthand for `@version`.
    pub fn at(version: RecipeVersion) -> Self {
        Condition::VersionEq(version)
    }

    /// Evaluate the condition.
    pub fn holds(&self, subject: &dyn Subject) -> bool {
        match self {
            Condition::Always => true,
            Condition::Version(req) => subject
                .version()
                .as_release()
                .is_some_and(|v| req.matches(v)),
            Condition::VersionEq(v) => subject.version() == v,
            Condition::Variant { name, value } => subject.variant(name).as_ref() == Some(value),
            Condition::All(conds) => conds.iter().all(|c| c.holds(subject)),
            Condition::Any(conds) => conds.iter().any(|c| c.holds(subject)),
            Condition::Not(cond) => !cond.holds(subject),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("always"),
            Condition::Version(req) => write!(f, "@{}", req),
            Condition::VersionEq(v) => write!(f, "@={}", v),
            Condition::Variant {
                name,
                value: VariantValue::Bool(true),
            } => write!(f, "+{}", name),
            Condition::Variant {
                name,
                value: VariantValue::Bool(false),
            } => write!(f, "~{}", name),
            Condition::Variant { name, value } => write!(f, "{}={}", name, value),
            Condition::All(conds) => join(f, conds, " and "),
            Condition::Any(conds) => join(f, conds, " or "),
            Condition::Not(cond) => write!(f, "not ({})", cond),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, conds: &[Condition], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, c) in conds.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Node {
        version: RecipeVersion,
        variants: HashMap<String, VariantValue>,
    }

    impl Subject for Node {
        fn version(&self) -> &RecipeVersion {
            &self.version
        }

        fn variant(&self, name: &str) -> Option<VariantValue> {
            self.variants.get(name).cloned()
        }
    }

    fn node(version: &str, variants: &[(&str, bool)]) -> Node {
        Node {
            version: version.parse().unwrap(),
            variants: variants
                .iter()
                .map(|(k, v)| (k.to_string(), VariantValue::Bool(*v)))
                .collect(),
        }
    }

    #[test]
    fn test_exact_version() {
        let cond = Condition::at(RecipeVersion::release(1, 11, 0));
        assert!(cond.holds(&RecipeVersion::release(1, 11, 0)));
        assert!(!cond.holds(&RecipeVersion::release(1, 11, 1)));
        assert!(!cond.holds(&RecipeVersion::branch("master")));
    }

    #[test]
    fn test_version_range_skips_branches() {
        let cond = Condition::Version(">=1.11".parse().unwrap());
        assert!(cond.holds(&RecipeVersion::release(1, 12, 0)));
        assert!(!cond.holds(&RecipeVersion::release(1, 10, 0)));
        assert!(!cond.holds(&RecipeVersion::branch("master")));
    }

    #[test]
    fn test_variant_and_combinators() {
        let with = node("1.12.1", &[("geant4", true)]);
        let without = node("1.12.1", &[("geant4", false)]);
        let unset = node("1.12.1", &[]);

        let cond = Condition::enabled("geant4");
        assert!(cond.holds(&with));
        assert!(!cond.holds(&without));
        assert!(!cond.holds(&unset));

        let both = Condition::All(vec![
            Condition::enabled("geant4"),
            Condition::Version(">=1.12".parse().unwrap()),
        ]);
        assert!(both.holds(&with));
        assert!(Condition::Not(Box::new(both)).holds(&without));
    }

    #[test]
    fn test_display() {
        assert_eq!(Condition::enabled("xercesc").to_string(), "+xercesc");
        assert_eq!(
            Condition::at(RecipeVersion::release(1, 12, 1)).to_string(),
            "@=1.12.1"
        );
    }
}
