//! Version requirement wrapper around `semver`.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A declared version requirement for a registry package.
///
/// Wraps [`semver::VersionReq`] and exposes the two satisfiability predicates
/// the change detector consumes: the requirement exactly as declared
/// ([`accepts`](Self::accepts)), and the prerelease-widened form used by
/// non-strict groups ([`accepts_any_prerelease`](Self::accepts_any_prerelease)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRange(VersionReq);

impl VersionRange {
    /// The requirement that accepts every version (`*`).
    pub fn any() -> Self {
        Self(VersionReq::STAR)
    }

    /// Parse a requirement string such as `>=13.0` or `~1.2.3`.
    pub fn parse(input: &str) -> Result<Self, semver::Error> {
        VersionReq::parse(input).map(Self)
    }

    /// Strict satisfaction: the requirement's predicate exactly as declared.
    /// Semver prerelease exclusion applies, so `>=6.0.0` rejects `6.1.0-beta`.
    pub fn accepts(&self, version: &Version) -> bool {
        self.0.matches(version)
    }

    /// Widened satisfaction: also accept a prerelease whose release form
    /// satisfies the range, so `>=6.0.0` accepts `6.1.0-beta`.
    pub fn accepts_any_prerelease(&self, version: &Version) -> bool {
        if self.0.matches(version) {
            return true;
        }
        if version.pre.is_empty() {
            return false;
        }
        let released = Version::new(version.major, version.minor, version.patch);
        self.0.matches(&released)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VersionRange {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn accepts_release_in_range() {
        let range = VersionRange::parse(">=6.0.0").unwrap();
        assert!(range.accepts(&v("6.0.0")));
        assert!(range.accepts(&v("7.2.1")));
        assert!(!range.accepts(&v("5.9.9")));
    }

    #[test]
    fn strict_rejects_prerelease() {
        let range = VersionRange::parse(">=6.0.0").unwrap();
        assert!(!range.accepts(&v("6.1.0-beta")));
    }

    #[test]
    fn widened_accepts_prerelease() {
        let range = VersionRange::parse(">=6.0.0").unwrap();
        assert!(range.accepts_any_prerelease(&v("6.1.0-beta")));
    }

    #[test]
    fn widened_still_rejects_out_of_range() {
        let range = VersionRange::parse(">=6.0.0").unwrap();
        assert!(!range.accepts_any_prerelease(&v("5.0.0-rc.1")));
        assert!(!range.accepts_any_prerelease(&v("5.0.0")));
    }

    #[test]
    fn any_accepts_everything_released() {
        let range = VersionRange::any();
        assert!(range.accepts(&v("0.0.1")));
        assert!(range.accepts(&v("99.0.0")));
    }

    #[test]
    fn default_is_any() {
        assert_eq!(VersionRange::default(), VersionRange::any());
    }

    #[test]
    fn serde_as_plain_string() {
        let range = VersionRange::parse("^1.2").unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "\"^1.2\"");
        let back: VersionRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(VersionRange::parse("not a range").is_err());
    }
}
