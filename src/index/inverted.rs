//! Inverted index over a line store
//!
//! Maps every word to the ascending list of line ids containing it, and
//! keeps the corpus-wide occurrence total of each word for the strict
//! connectivity filter. Large stores are indexed in parallel chunks that
//! are merged afterwards.

use crate::corpus::store::{Line, LineStore};
use crate::multiset::WordBag;
use crate::types::{LineId, WordId};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Below this many lines, sequential indexing is faster
const PARALLEL_THRESHOLD: usize = 10_000;

/// Lines per parallel indexing chunk
const CHUNK_SIZE: usize = 2_048;

/// Word → postings, derived from a [`LineStore`].
///
/// Must be rebuilt whenever the line set changes; it holds no references
/// into the store it was built from.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: FxHashMap<WordId, Vec<LineId>>,
    totals: FxHashMap<WordId, usize>,
}

impl InvertedIndex {
    /// Build the index for every line in `store`
    pub fn build(store: &LineStore) -> Self {
        let mut index = if store.len() < PARALLEL_THRESHOLD {
            let mut index = Self::default();
            for line in store.iter() {
                index.insert(line);
            }
            index
        } else {
            store
                .lines()
                .par_chunks(CHUNK_SIZE)
                .map(|chunk| {
                    let mut partial = Self::default();
                    for line in chunk {
                        partial.insert(line);
                    }
                    partial
                })
                .reduce(Self::default, Self::merge)
        };

        for ids in index.postings.values_mut() {
            ids.sort_unstable();
        }
        index
    }

    fn insert(&mut self, line: &Line) {
        for (word, count) in line.words.entries() {
            self.postings.entry(word).or_default().push(line.id);
            *self.totals.entry(word).or_insert(0) += count as usize;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (word, ids) in other.postings {
            self.postings.entry(word).or_default().extend(ids);
        }
        for (word, total) in other.totals {
            *self.totals.entry(word).or_insert(0) += total;
        }
        self
    }

    /// Ascending ids of the lines containing `word`
    pub fn postings(&self, word: WordId) -> &[LineId] {
        self.postings.get(&word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct lines containing `word`
    pub fn document_frequency(&self, word: WordId) -> usize {
        self.postings(word).len()
    }

    /// Occurrences of `word` across the corpus, counting repeats within a line
    pub fn total_count(&self, word: WordId) -> usize {
        self.totals.get(&word).copied().unwrap_or(0)
    }

    /// Number of distinct indexed words
    pub fn word_count(&self) -> usize {
        self.postings.len()
    }

    /// Indexed words with their postings, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &[LineId])> + '_ {
        self.postings.iter().map(|(&w, ids)| (w, ids.as_slice()))
    }

    /// Ascending ids of every line sharing at least one word with `target`
    pub fn candidates(&self, target: &WordBag) -> Vec<LineId> {
        let mut ids: Vec<LineId> = target
            .support()
            .flat_map(|w| self.postings(w).iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Mean postings length over the words of `bag`, repeats included.
    ///
    /// Returns 0 for an empty bag.
    pub fn mean_postings_len(&self, bag: &WordBag) -> f64 {
        if bag.is_empty() {
            return 0.0;
        }
        let sum: usize = bag
            .entries()
            .map(|(w, c)| self.document_frequency(w) * c as usize)
            .sum();
        sum as f64 / bag.len() as f64
    }

    /// True when every line of `store` is posted under each of its words and
    /// no posting refers to a line outside `store`
    pub fn is_consistent_with(&self, store: &LineStore) -> bool {
        let complete = store.iter().all(|line| {
            line.words
                .support()
                .all(|w| self.postings(w).binary_search(&line.id).is_ok())
        });
        let no_stale = self
            .postings
            .values()
            .all(|ids| ids.iter().all(|&id| store.contains(id)));
        complete && no_stale
    }
}
