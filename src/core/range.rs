//! Version requirement ranges.
//!
//! Dependency requirements are written as semver requirements. Converting them
//! to PubGrub ranges lets several requirements on the same package be
//! intersected and checked for emptiness.

use pubgrub::Range;
use semver::{Comparator, Op, Version, VersionReq};

/// Convert a semver VersionReq to a PubGrub Range.
pub fn version_req_to_range(req: &VersionReq) -> Range<Version> {
    req.comparators
        .iter()
        .fold(Range::full(), |range, comp| range.intersection(&comparator_to_range(comp)))
}

/// Intersect several requirements into one range.
pub fn intersect_reqs<'a>(reqs: impl IntoIterator<Item = &'a VersionReq>) -> Range<Version> {
    reqs.into_iter()
        .fold(Range::full(), |range, req| range.intersection(&version_req_to_range(req)))
}

/// Convert a single semver Comparator to a PubGrub Range.
fn comparator_to_range(comp: &Comparator) -> Range<Version> {
    let major = comp.major;
    let minor = comp.minor.unwrap_or(0);
    let patch = comp.patch.unwrap_or(0);

    let version = Version::new(major, minor, patch);

    // First version past the components the comparator spelled out.
    let next_unspecified = if comp.minor.is_none() {
        Version::new(major + 1, 0, 0)
    } else if comp.patch.is_none() {
        Version::new(major, minor + 1, 0)
    } else {
        Version::new(major, minor, patch + 1)
    };

    match comp.op {
        Op::Exact | Op::Wildcard => Range::between(version, next_unspecified),

        Op::Greater => Range::higher_than(next_unspecified),

        Op::GreaterEq => Range::higher_than(version),

        Op::Less => Range::strictly_lower_than(version),

        Op::LessEq => Range::strictly_lower_than(next_unspecified),

        Op::Tilde => {
            // ~1.2.3 means >=1.2.3 <1.3.0, ~1 means >=1.0.0 <2.0.0
            let upper = if comp.minor.is_some() {
                Version::new(major, minor + 1, 0)
            } else {
                Version::new(major + 1, 0, 0)
            };

            Range::between(version, upper)
        }

        Op::Caret => {
            // ^x.y.z allows changes that don't modify the left-most non-zero digit
            let upper = if major > 0 || comp.minor.is_none() {
                Version::new(major + 1, 0, 0)
            } else if minor > 0 || comp.patch.is_none() {
                Version::new(0, minor + 1, 0)
            } else {
                Version::new(0, 0, patch + 1)
            };

            Range::between(version, upper)
        }

        _ => Range::full(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(req: &str) -> Range<Version> {
        version_req_to_range(&req.parse().unwrap())
    }

    #[test]
    fn test_open_ended_minimum() {
        let r = range(">=3.12");
        assert!(r.contains(&Version::new(3, 12, 0)));
        assert!(r.contains(&Version::new(4, 0, 0)));
        assert!(!r.contains(&Version::new(3, 11, 9)));
    }

    #[test]
    fn test_partial_exact() {
        let r = range("=6.8");
        assert!(r.contains(&Version::new(6, 8, 0)));
        assert!(r.contains(&Version::new(6, 8, 6)));
        assert!(!r.contains(&Version::new(6, 9, 0)));
    }

    #[test]
    fn test_caret_range() {
        let r = range("^1.2.3");
        assert!(r.contains(&Version::new(1, 9, 0)));
        assert!(!r.contains(&Version::new(2, 0, 0)));
        assert!(!r.contains(&Version::new(1, 2, 2)));
    }

    #[test]
    fn test_strict_bounds() {
        let r = range(">1.2, <2");
        assert!(!r.contains(&Version::new(1, 2, 5)));
        assert!(r.contains(&Version::new(1, 3, 0)));
        assert!(!r.contains(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_intersection_can_be_empty() {
        let a: VersionReq = ">=2.0".parse().unwrap();
        let b: VersionReq = "<1.5".parse().unwrap();
        assert_eq!(intersect_reqs([&a, &b]), Range::empty());

        let c: VersionReq = ">=1.49".parse().unwrap();
        let d: VersionReq = "<2".parse().unwrap();
        assert!(intersect_reqs([&c, &d]).contains(&Version::new(1, 72, 0)));
    }
}
