use std::cmp::Ordering;
use std::fmt;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::entity::SortDirection;

/// Largest component value that still sorts correctly in an SQLite INTEGER column.
const MAX_COMPONENT: u64 = i64::MAX as u64;

/// A parsed mod or add-on version.
///
/// An empty `pre_release` marks a final release, which is newer than any
/// pre-release of the same `major.minor.patch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: String,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: String::new(),
        }
    }

    pub fn with_pre_release(mut self, label: &str) -> Self {
        self.pre_release = label.to_string();
        self
    }

    /// Parse a version string, falling back to `0.0.0` when it is not a version.
    pub fn parse(version: &str) -> Self {
        Self::try_parse(version).unwrap_or_default()
    }

    /// Parse a version string into a SemanticVersion, normalizing partial versions.
    ///
    /// Strips a single leading `v`, pads partial cores with zeros and drops
    /// build metadata. Components above `i64::MAX` are rejected.
    ///
    /// Examples:
    /// - "1" -> 1.0.0
    /// - "v1.2" -> 1.2.0
    /// - "1.2-beta" -> 1.2.0-beta
    /// - "1.2.3+build.7" -> 1.2.3
    pub fn try_parse(version: &str) -> Option<Self> {
        let version = version.trim();
        let version = version
            .strip_prefix('v')
            .or_else(|| version.strip_prefix('V'))
            .unwrap_or(version);

        let core_end = version.find(['-', '+']).unwrap_or(version.len());
        let (core, suffix) = version.split_at(core_end);

        let parts: Vec<&str> = core.split('.').collect();
        let normalized = match parts.len() {
            1 => format!("{}.0.0{}", parts[0], suffix),
            2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
            _ => version.to_string(),
        };

        Version::parse(&normalized)
            .ok()
            .filter(|v| [v.major, v.minor, v.patch].iter().all(|c| *c <= MAX_COMPONENT))
            .map(Self::from)
    }

    pub fn is_pre_release(&self) -> bool {
        !self.pre_release.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl From<Version> for SemanticVersion {
    fn from(version: Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre_release: version.pre.as_str().to_string(),
        }
    }
}

/// Total order between two versions.
///
/// Numeric triple first. For equal triples a final release beats any
/// pre-release, and two pre-release labels compare as whole strings.
pub fn compare(a: &SemanticVersion, b: &SemanticVersion) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| match (a.is_pre_release(), b.is_pre_release()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (true, true) => a.pre_release.cmp(&b.pre_release),
        })
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.is_pre_release() {
            write!(f, "-{}", self.pre_release)?;
        }
        Ok(())
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Find the latest version from a list of version strings
///
/// Unparseable entries are skipped rather than treated as `0.0.0`.
pub fn find_latest(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter_map(|v| SemanticVersion::try_parse(v).map(|parsed| (v, parsed)))
        .max_by(|(_, a), (_, b)| compare(a, b))
        .map(|(original, _)| original.clone())
}

/// Sort version strings, keeping the original spelling of each entry
///
/// Unparseable entries are dropped, as in [`find_latest`].
pub fn sort_version_strings(versions: &[String], direction: SortDirection) -> Vec<String> {
    let mut parsed: Vec<(SemanticVersion, &String)> = versions
        .iter()
        .filter_map(|raw| SemanticVersion::try_parse(raw).map(|v| (v, raw)))
        .collect();
    parsed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Ascending => compare(a, b),
        SortDirection::LatestFirst => compare(b, a),
    });
    parsed.into_iter().map(|(_, raw)| raw.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(major: u64, minor: u64, patch: u64, label: &str) -> SemanticVersion {
        SemanticVersion::new(major, minor, patch).with_pre_release(label)
    }

    #[rstest]
    #[case("1.2.3", v(1, 2, 3, ""))]
    #[case("1", v(1, 0, 0, ""))]
    #[case("1.2", v(1, 2, 0, ""))]
    #[case("v3.9.8", v(3, 9, 8, ""))]
    #[case("V2.0", v(2, 0, 0, ""))]
    #[case("  1.0.0-beta  ", v(1, 0, 0, "beta"))]
    #[case("1.2-rc.1", v(1, 2, 0, "rc.1"))]
    #[case("1.2.3+build.7", v(1, 2, 3, ""))]
    #[case("1.2.3-alpha+build", v(1, 2, 3, "alpha"))]
    fn parse_accepts_version_strings(#[case] input: &str, #[case] expected: SemanticVersion) {
        assert_eq!(SemanticVersion::parse(input), expected);
    }

    #[rstest]
    #[case("")]
    #[case("invalid")]
    #[case("1.2.3.4")]
    #[case("01.2.3")]
    #[case("1.2.3-")]
    #[case("latest")]
    #[case("9223372036854775808.0.0")]
    #[case("1.18446744073709551615.0")]
    fn parse_falls_back_to_zero_for_garbage(#[case] input: &str) {
        assert!(SemanticVersion::try_parse(input).is_none());
        assert!(SemanticVersion::parse(input).is_zero());
    }

    #[rstest]
    #[case(v(1, 0, 0, ""), v(1, 0, 0, "beta"), Ordering::Greater)]
    #[case(v(1, 2, 0, ""), v(1, 1, 9, ""), Ordering::Greater)]
    #[case(v(2, 0, 0, "alpha"), v(1, 9, 9, ""), Ordering::Greater)]
    #[case(v(1, 0, 0, "beta"), v(1, 0, 0, "rc1"), Ordering::Less)]
    #[case(v(1, 0, 0, "rc1"), v(1, 0, 0, "rc1"), Ordering::Equal)]
    #[case(v(0, 0, 1, ""), v(0, 1, 0, ""), Ordering::Less)]
    #[case(v(10, 0, 0, ""), v(9, 99, 99, ""), Ordering::Greater)]
    fn compare_returns_expected(
        #[case] a: SemanticVersion,
        #[case] b: SemanticVersion,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare(&a, &b), expected);
        assert_eq!(compare(&b, &a), expected.reverse());
    }

    #[test]
    fn compare_is_reflexive_and_transitive_over_fixture_set() {
        let versions = vec![
            v(0, 9, 0, ""),
            v(1, 0, 0, "alpha"),
            v(1, 0, 0, "beta"),
            v(1, 0, 0, "rc1"),
            v(1, 0, 0, ""),
            v(1, 0, 1, ""),
            v(2, 0, 0, "alpha"),
        ];

        for a in &versions {
            assert_eq!(compare(a, a), Ordering::Equal);
            for b in &versions {
                assert_eq!(compare(a, b), compare(b, a).reverse());
                for c in &versions {
                    if compare(a, b) == Ordering::Less && compare(b, c) == Ordering::Less {
                        assert_eq!(compare(a, c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn sorting_latest_first_puts_release_before_its_pre_releases() {
        let mut versions = vec![
            v(1, 0, 0, "rc1"),
            v(1, 0, 0, ""),
            v(0, 9, 0, ""),
            v(1, 0, 0, "beta"),
        ];

        versions.sort_by(|a, b| compare(b, a));

        assert_eq!(
            versions,
            vec![
                v(1, 0, 0, ""),
                v(1, 0, 0, "rc1"),
                v(1, 0, 0, "beta"),
                v(0, 9, 0, ""),
            ]
        );
    }

    #[rstest]
    #[case(v(1, 2, 3, ""), "1.2.3")]
    #[case(v(1, 0, 0, "beta.2"), "1.0.0-beta.2")]
    #[case(SemanticVersion::default(), "0.0.0")]
    fn display_renders_version(#[case] version: SemanticVersion, #[case] expected: &str) {
        assert_eq!(version.to_string(), expected);
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&v(3, 9, 0, "rc")).unwrap();
        assert_eq!(json, "\"3.9.0-rc\"");

        let parsed: SemanticVersion = serde_json::from_str("\"nonsense\"").unwrap();
        assert!(parsed.is_zero());
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec!["v1.0.0", "v2.0.0", "v1.5.0"], Some("v2.0.0"))]
    #[case(vec!["2.0.0-beta", "1.9.9"], Some("2.0.0-beta"))]
    #[case(vec!["2.0.0-beta", "2.0.0"], Some("2.0.0"))]
    #[case(vec!["invalid", "0.1.0", "not-semver"], Some("0.1.0"))]
    #[case(vec!["invalid", "not-semver"], None)]
    fn find_latest_returns_expected(#[case] versions: Vec<&str>, #[case] expected: Option<&str>) {
        let versions: Vec<String> = versions.into_iter().map(|s| s.to_string()).collect();
        assert_eq!(find_latest(&versions), expected.map(|s| s.to_string()));
    }

    #[test]
    fn parse_accepts_largest_storable_component() {
        assert_eq!(
            SemanticVersion::try_parse("9223372036854775807.0.0"),
            Some(v(i64::MAX as u64, 0, 0, ""))
        );
    }

    #[rstest]
    #[case(vec![], SortDirection::LatestFirst, vec![])]
    #[case(
        vec!["1.0.0-rc1", "v1.0.0", "0.9.0", "1.0.0-beta"],
        SortDirection::LatestFirst,
        vec!["v1.0.0", "1.0.0-rc1", "1.0.0-beta", "0.9.0"]
    )]
    #[case(
        vec!["1.10.0", "1.9", "1.10.0-rc.1"],
        SortDirection::Ascending,
        vec!["1.9", "1.10.0-rc.1", "1.10.0"]
    )]
    #[case(vec!["latest", "2.0.0", "", "1.0.0"], SortDirection::LatestFirst, vec!["2.0.0", "1.0.0"])]
    fn sort_version_strings_returns_expected(
        #[case] versions: Vec<&str>,
        #[case] direction: SortDirection,
        #[case] expected: Vec<&str>,
    ) {
        let versions: Vec<String> = versions.into_iter().map(String::from).collect();
        assert_eq!(sort_version_strings(&versions, direction), expected);
    }
}
