use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// Lowest possible version, the starting point of [`max_version`]
const SENTINEL_VERSION: &str = "0.0";

/// A dotted numeric version such as `1.0.198.0`
///
/// Components are compared numerically from left to right. A missing
/// component compares as zero, so `1.0` equals `1.0.0` and is older than
/// `1.0.0.1`.
#[derive(Debug, Clone)]
pub struct DottedVersion {
    components: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid dotted version: {0:?}")]
pub struct ParseVersionError(String);

impl DottedVersion {
    /// Parse a version made of one or more dot-separated decimal numbers.
    ///
    /// Examples:
    /// - "1" -> [1]
    /// - "1.0.198.0" -> [1, 0, 198, 0]
    /// - "1..2", "v1.2", "1.2-rc" -> error
    pub fn parse(version: &str) -> Result<Self, ParseVersionError> {
        let components = version
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u64>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ParseVersionError(version.to_string()))?;

        Ok(Self { components })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for DottedVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components = self.components.iter();
        if let Some(first) = components.next() {
            write!(f, "{first}")?;
        }
        for component in components {
            write!(f, ".{component}")?;
        }
        Ok(())
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

/// Strip a single trailing `.0` from a version string.
///
/// Only one suffix is removed: `1.0.0` becomes `1.0`, not `1`.
pub fn normalize(version: &str) -> &str {
    version.strip_suffix(".0").unwrap_or(version)
}

/// Find the highest version among the reported ones.
///
/// Starts from `0.0` and keeps the first of equal versions, so the result
/// for an empty report is `"0.0"`. Unparseable entries are skipped.
pub fn max_version(reports: &IndexMap<String, String>) -> String {
    let sentinel = (SENTINEL_VERSION.to_string(), DottedVersion { components: vec![0, 0] });

    reports
        .values()
        .filter_map(|v| DottedVersion::parse(v).ok().map(|parsed| (v.clone(), parsed)))
        .fold(sentinel, |best, candidate| {
            if best.1 < candidate.1 { candidate } else { best }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn report(versions: &[(&str, &str)]) -> IndexMap<String, String> {
        versions
            .iter()
            .map(|(name, v)| (name.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("1.0.198.0", "1.0.166.1", Ordering::Greater)]
    #[case("1.0", "1.0.0.1", Ordering::Less)]
    #[case("1.0", "1.0.1", Ordering::Less)]
    #[case("1.0", "1.0.0", Ordering::Equal)]
    #[case("1.10", "1.9", Ordering::Greater)] // numeric, not lexical
    #[case("2", "1.99.99", Ordering::Greater)]
    fn cmp_uses_numeric_components(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        let a = DottedVersion::parse(a).unwrap();
        let b = DottedVersion::parse(b).unwrap();
        assert_eq!(a.cmp(&b), expected);
        assert_eq!(b.cmp(&a), expected.reverse());
    }

    #[rstest]
    #[case("")]
    #[case("1..2")]
    #[case("v1.2")]
    #[case("1.2-rc1")]
    #[case("1.2.")]
    #[case("+1.2")]
    fn parse_rejects_non_numeric_versions(#[case] input: &str) {
        assert!(DottedVersion::parse(input).is_err());
    }

    #[test]
    fn display_keeps_original_components() {
        let version: DottedVersion = "1.0.198.0".parse().unwrap();
        assert_eq!(version.to_string(), "1.0.198.0");
        assert_eq!(version.components(), &[1, 0, 198, 0]);
    }

    #[rstest]
    #[case("1.0.198.0", "1.0.198")]
    #[case("1.0.0", "1.0")] // only one suffix is removed
    #[case("1.0.166.1", "1.0.166.1")]
    #[case("1.0.10", "1.0.10")]
    fn normalize_strips_single_trailing_zero(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn normalize_is_idempotent_for_versions_without_trailing_zero() {
        let once = normalize("1.0.198.0");
        assert_eq!(normalize(once), once);
    }

    #[test]
    fn max_version_picks_highest_report() {
        let reports = report(&[("dh1", "1.0.166.1"), ("dh2", "1.0.198"), ("addin", "1.0.198")]);
        assert_eq!(max_version(&reports), "1.0.198");
    }

    #[test]
    fn max_version_returns_sentinel_for_empty_report() {
        assert_eq!(max_version(&IndexMap::new()), "0.0");
    }

    #[test]
    fn max_version_keeps_first_of_equal_versions() {
        let reports = report(&[("dh1", "1.0"), ("dh2", "1.0.0")]);
        assert_eq!(max_version(&reports), "1.0");
    }

    #[test]
    fn max_version_skips_unparseable_entries() {
        let reports = report(&[("dh1", "garbage"), ("dh2", "1.2")]);
        assert_eq!(max_version(&reports), "1.2");
    }
}
