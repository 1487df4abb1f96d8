//! Ordering of anything that carries a version

use std::cmp::Ordering;

use crate::version::semver::{SemanticVersion, compare};
use crate::version::types::ModVersion;

/// Direction of a version listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Oldest first
    Ascending,
    /// Newest first, as shown on mod pages
    #[default]
    LatestFirst,
}

/// Something identified by an id whose ordering is defined by its version
pub trait VersionedEntity {
    fn id(&self) -> i64;

    fn version(&self) -> &SemanticVersion;
}

impl VersionedEntity for ModVersion {
    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> &SemanticVersion {
        &self.version
    }
}

/// Compare by version, then by id so that equal versions still order strictly.
pub fn compare_entities<T: VersionedEntity>(a: &T, b: &T, direction: SortDirection) -> Ordering {
    let by_version = compare(a.version(), b.version());
    let by_version = match direction {
        SortDirection::Ascending => by_version,
        SortDirection::LatestFirst => by_version.reverse(),
    };
    by_version.then(a.id().cmp(&b.id()))
}

pub fn sort_versions<T: VersionedEntity>(entities: &mut [T], direction: SortDirection) {
    entities.sort_by(|a, b| compare_entities(a, b, direction));
}

/// The newest entity; on a version tie the lowest id wins.
pub fn latest<T: VersionedEntity>(entities: &[T]) -> Option<&T> {
    entities
        .iter()
        .min_by(|a, b| compare_entities(*a, *b, SortDirection::LatestFirst))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry {
        id: i64,
        version: SemanticVersion,
    }

    impl VersionedEntity for Entry {
        fn id(&self) -> i64 {
            self.id
        }

        fn version(&self) -> &SemanticVersion {
            &self.version
        }
    }

    fn entries(versions: &[(i64, &str)]) -> Vec<Entry> {
        versions
            .iter()
            .map(|(id, v)| Entry {
                id: *id,
                version: SemanticVersion::parse(v),
            })
            .collect()
    }

    fn ids(entries: &[Entry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn sort_versions_latest_first() {
        let mut list = entries(&[(1, "1.0.0-rc1"), (2, "1.0.0"), (3, "0.9.0"), (4, "1.0.0-beta")]);

        sort_versions(&mut list, SortDirection::LatestFirst);

        assert_eq!(ids(&list), vec![2, 1, 4, 3]);
    }

    #[test]
    fn sort_versions_ascending() {
        let mut list = entries(&[(1, "1.0.0-rc1"), (2, "1.0.0"), (3, "0.9.0"), (4, "1.0.0-beta")]);

        sort_versions(&mut list, SortDirection::Ascending);

        assert_eq!(ids(&list), vec![3, 4, 1, 2]);
    }

    #[test]
    fn sort_versions_breaks_ties_by_id_in_both_directions() {
        let mut list = entries(&[(9, "2.0.0"), (3, "2.0.0"), (5, "1.0.0")]);

        sort_versions(&mut list, SortDirection::LatestFirst);
        assert_eq!(ids(&list), vec![3, 9, 5]);

        sort_versions(&mut list, SortDirection::Ascending);
        assert_eq!(ids(&list), vec![5, 3, 9]);
    }

    #[test]
    fn latest_picks_final_release_over_pre_release() {
        let list = entries(&[(1, "2.0.0-rc.1"), (2, "2.0.0"), (3, "1.9.9")]);

        assert_eq!(latest(&list).map(|e| e.id), Some(2));
    }

    #[test]
    fn latest_returns_none_for_empty_slice() {
        let list: Vec<Entry> = vec![];
        assert!(latest(&list).is_none());
    }
}
