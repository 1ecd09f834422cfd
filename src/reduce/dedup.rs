//! Duplicate phrase resolution
//!
//! Lines with the same canonical key are interchangeable for matching.
//! Strategy: group by key in input order, keep the first id of every group,
//! and remember the rest so they can be reported next to the survivor.

use crate::corpus::store::LineStore;
use crate::types::{LineId, WordId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

/// Surviving line id → the other ids sharing its canonical key
pub type DuplicatesMap = BTreeMap<LineId, Vec<LineId>>;

/// Line ids grouped by canonical key, first-seen id first
#[derive(Debug, Clone, Default)]
pub struct DuplicateGroups {
    groups: FxHashMap<Vec<WordId>, Vec<LineId>>,
}

impl DuplicateGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every line of `store` to its group and return the ids that are
    /// not the first of their group.
    ///
    /// Lines already recorded are not added twice, so this can run on every
    /// reducer pass.
    pub fn record(&mut self, store: &LineStore) -> FxHashSet<LineId> {
        let mut redundant = FxHashSet::default();
        for line in store.iter() {
            let group = self
                .groups
                .entry(line.canonical_key().to_vec())
                .or_default();
            if !group.contains(&line.id) {
                group.push(line.id);
            }
            if group[0] != line.id {
                redundant.insert(line.id);
            }
        }
        redundant
    }

    /// Ids sharing `key`, first-seen first
    pub fn group(&self, key: &[WordId]) -> Option<&[LineId]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of keys held by more than one line
    pub fn duplicated_keys(&self) -> usize {
        self.groups.values().filter(|g| g.len() > 1).count()
    }

    /// Report, for every line of `store`, the other ids with the same key.
    ///
    /// Lines without duplicates are left out.
    pub fn report(&self, store: &LineStore) -> DuplicatesMap {
        let mut map = DuplicatesMap::new();
        for line in store.iter() {
            let Some(group) = self.group(line.canonical_key()) else {
                continue;
            };
            let mut others: Vec<LineId> =
                group.iter().copied().filter(|&id| id != line.id).collect();
            if !others.is_empty() {
                others.sort_unstable();
                map.insert(line.id, others);
            }
        }
        map
    }
}

/// Keep only the first line of every duplicate group.
///
/// Returns the filtered store and the number of lines removed.
pub fn filter_duplicates(store: &LineStore, groups: &mut DuplicateGroups) -> (LineStore, usize) {
    let redundant = groups.record(store);
    if redundant.is_empty() {
        return (store.clone(), 0);
    }
    let kept = store.retain(|line| !redundant.contains(&line.id));
    (kept, redundant.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LineStore {
        LineStore::from_tokenized(vec![
            (1, vec!["the", "cat", "sat"]),
            (2, vec!["sat", "the", "cat"]),
            (3, vec!["a", "dog", "ran"]),
            (4, vec!["a", "dog", "ran"]),
            (5, vec!["a", "dog", "ran"]),
            (6, vec!["alone", "here", "now"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_seen_kept() {
        let store = store();
        let mut groups = DuplicateGroups::new();
        let (kept, removed) = filter_duplicates(&store, &mut groups);

        assert_eq!(removed, 3);
        assert_eq!(kept.ids().collect::<Vec<_>>(), vec![1, 3, 6]);
        assert_eq!(groups.duplicated_keys(), 2);
    }

    #[test]
    fn test_report_lists_other_ids() {
        let store = store();
        let mut groups = DuplicateGroups::new();
        let (kept, _) = filter_duplicates(&store, &mut groups);
        let report = groups.report(&kept);

        assert_eq!(report.get(&1), Some(&vec![2]));
        assert_eq!(report.get(&3), Some(&vec![4, 5]));
        assert!(!report.contains_key(&6));
    }

    #[test]
    fn test_record_is_idempotent_across_passes() {
        let store = store();
        let mut groups = DuplicateGroups::new();
        let (kept, _) = filter_duplicates(&store, &mut groups);
        let (again, removed) = filter_duplicates(&kept, &mut groups);

        assert_eq!(removed, 0);
        assert_eq!(again.len(), kept.len());
        let key = store.line(3).unwrap().canonical_key();
        assert_eq!(groups.group(key), Some(&[3, 4, 5][..]));
    }

    #[test]
    fn test_empty_store() {
        let store = LineStore::default();
        let mut groups = DuplicateGroups::new();
        let (kept, removed) = filter_duplicates(&store, &mut groups);
        assert!(kept.is_empty());
        assert_eq!(removed, 0);
        assert!(groups.report(&kept).is_empty());
    }
}
