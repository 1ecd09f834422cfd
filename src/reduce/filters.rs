//! Length and connectivity filters
//!
//! A word that occurs in fewer than three lines can never be balanced: one
//! line holds it on the seed side and two independent lines would be needed
//! to hold it on the completion side. Lines carrying such a word ("oddballs")
//! are removed.

use crate::corpus::store::LineStore;
use crate::index::InvertedIndex;
use crate::types::{LineId, OddballPolicy};
use rustc_hash::FxHashSet;

/// Minimum number of distinct lines a word must appear in
pub const MIN_WORD_LINES: usize = 3;

/// Drop lines with fewer than `min_tokens` words.
///
/// Returns the filtered store and the number of lines removed.
pub fn filter_short(store: &LineStore, min_tokens: usize) -> (LineStore, usize) {
    let kept = store.retain(|line| line.len() >= min_tokens);
    let removed = store.len() - kept.len();
    (kept, removed)
}

/// Ids of the lines the connectivity filter would remove.
///
/// `index` must have been built from `store`.
pub fn find_oddballs(
    store: &LineStore,
    index: &InvertedIndex,
    policy: OddballPolicy,
) -> FxHashSet<LineId> {
    let mut oddballs: FxHashSet<LineId> = index
        .iter()
        .filter(|(_, ids)| ids.len() < MIN_WORD_LINES)
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect();

    if policy == OddballPolicy::Strict {
        for line in store.iter() {
            if oddballs.contains(&line.id) {
                continue;
            }
            // Enough other occurrences must exist to fill both sides of an equation.
            let starved = line.words.entries().any(|(word, m)| {
                let m = m as usize;
                index.total_count(word).saturating_sub(m) < 2 * m
            });
            if starved {
                oddballs.insert(line.id);
            }
        }
    }

    oddballs
}

/// Remove oddball lines.
///
/// Returns the filtered store and the number of lines removed.
pub fn filter_oddballs(
    store: &LineStore,
    index: &InvertedIndex,
    policy: OddballPolicy,
) -> (LineStore, usize) {
    let oddballs = find_oddballs(store, index, policy);
    if oddballs.is_empty() {
        return (store.clone(), 0);
    }
    let kept = store.retain(|line| !oddballs.contains(&line.id));
    (kept, oddballs.len())
}
