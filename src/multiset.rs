//! Word multisets
//!
//! A [`WordBag`] keeps two views of the same multiset: a sorted id sequence
//! for exact equality and canonical keys, and a frequency map for fast
//! sub-multiset tests. Both views are built together and never mutated.

use crate::types::WordId;
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};

/// An immutable multiset of interned words.
#[derive(Debug, Clone, Default)]
pub struct WordBag {
    sorted: Vec<WordId>,
    counts: FxHashMap<WordId, u32>,
}

impl WordBag {
    /// Build a bag from any sequence of word ids
    pub fn from_words(words: impl IntoIterator<Item = WordId>) -> Self {
        let mut sorted: Vec<WordId> = words.into_iter().collect();
        sorted.sort_unstable();
        Self::from_sorted(sorted)
    }

    fn from_sorted(sorted: Vec<WordId>) -> Self {
        let mut counts = FxHashMap::with_capacity_and_hasher(sorted.len(), Default::default());
        for &w in &sorted {
            *counts.entry(w).or_insert(0) += 1;
        }
        Self { sorted, counts }
    }

    /// Total number of words, counting repeats
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Sorted word ids; this is the canonical key of the bag
    pub fn as_slice(&self) -> &[WordId] {
        &self.sorted
    }

    /// Multiplicity of `word` in the bag
    pub fn count(&self, word: WordId) -> u32 {
        self.counts.get(&word).copied().unwrap_or(0)
    }

    /// Number of distinct words
    pub fn distinct_len(&self) -> usize {
        self.counts.len()
    }

    /// Distinct words with their multiplicities, ascending by id
    pub fn entries(&self) -> impl Iterator<Item = (WordId, u32)> + '_ {
        let mut i = 0;
        std::iter::from_fn(move || {
            let word = *self.sorted.get(i)?;
            let start = i;
            while i < self.sorted.len() && self.sorted[i] == word {
                i += 1;
            }
            Some((word, (i - start) as u32))
        })
    }

    /// Distinct words, ascending by id
    pub fn support(&self) -> impl Iterator<Item = WordId> + '_ {
        self.entries().map(|(w, _)| w)
    }

    /// The frequency view
    pub fn counts(&self) -> &FxHashMap<WordId, u32> {
        &self.counts
    }

    /// Multiset union (concatenation of occurrences)
    pub fn union(&self, other: &WordBag) -> WordBag {
        let mut merged = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.sorted.len() && j < other.sorted.len() {
            if self.sorted[i] <= other.sorted[j] {
                merged.push(self.sorted[i]);
                i += 1;
            } else {
                merged.push(other.sorted[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&self.sorted[i..]);
        merged.extend_from_slice(&other.sorted[j..]);
        Self::from_sorted(merged)
    }

    /// Union of every bag in `bags`
    pub fn union_all<'a>(bags: impl IntoIterator<Item = &'a WordBag>) -> WordBag {
        WordBag::from_words(bags.into_iter().flat_map(|b| b.sorted.iter().copied()))
    }

    /// True when every word occurs in `other` at least as often as in `self`
    pub fn is_submultiset_of(&self, other: &WordBag) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.counts.iter().all(|(&w, &c)| other.count(w) >= c)
    }

    /// `self - other`, or `None` when `other` is not contained in `self`
    pub fn checked_sub(&self, other: &WordBag) -> Option<WordBag> {
        if !other.is_submultiset_of(self) {
            return None;
        }
        let mut remaining = Vec::with_capacity(self.len() - other.len());
        let mut j = 0;
        for &w in &self.sorted {
            if j < other.sorted.len() && other.sorted[j] == w {
                j += 1;
            } else {
                remaining.push(w);
            }
        }
        Some(Self::from_sorted(remaining))
    }
}

impl PartialEq for WordBag {
    fn eq(&self, other: &Self) -> bool {
        self.sorted == other.sorted
    }
}

impl Eq for WordBag {}

impl Hash for WordBag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted.hash(state);
    }
}
