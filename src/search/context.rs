//! Immutable search context
//!
//! The line store and its inverted index, built once before any parallel
//! phase and shared read-only by every work unit.

use crate::corpus::store::LineStore;
use crate::errors::Result;
use crate::index::InvertedIndex;
use crate::multiset::WordBag;
use crate::reduce::Reduction;
use crate::types::LineId;
use serde::{Deserialize, Serialize};

/// Line store plus the index built from it
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    store: LineStore,
    index: InvertedIndex,
}

impl SearchContext {
    /// Index `store` and wrap both
    pub fn new(store: LineStore) -> Self {
        let index = InvertedIndex::build(&store);
        Self { store, index }
    }

    pub fn store(&self) -> &LineStore {
        &self.store
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn bag(&self, id: LineId) -> Result<&WordBag> {
        self.store.bag(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        let total_words = self.store.iter().map(|l| l.len()).sum();
        let postings: usize = self.index.iter().map(|(_, ids)| ids.len()).sum();
        let mean_postings_len = if self.index.word_count() == 0 {
            0.0
        } else {
            postings as f64 / self.index.word_count() as f64
        };
        CorpusStats {
            lines: self.store.len(),
            distinct_words: self.index.word_count(),
            total_words,
            mean_postings_len,
        }
    }
}

impl From<Reduction> for SearchContext {
    fn from(reduction: Reduction) -> Self {
        Self {
            store: reduction.store,
            index: reduction.index,
        }
    }
}

/// Size figures of a search context
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    pub lines: usize,
    pub distinct_words: usize,
    pub total_words: usize,
    pub mean_postings_len: f64,
}
