//! Line store
//!
//! Holds every corpus line as an id plus its word multiset. Words are
//! interned once in a shared [`StringPool`]; filtered stores share the pool
//! of the store they were derived from, so word ids stay comparable.

use crate::errors::{ParadelleError, Result};
use crate::multiset::WordBag;
use crate::nlp::tokenizer::Tokenize;
use crate::types::{LineId, LineRecord, StringPool, WordId};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One corpus line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub words: WordBag,
}

impl Line {
    /// Sorted word ids; equal keys mean duplicate phrases
    pub fn canonical_key(&self) -> &[WordId] {
        self.words.as_slice()
    }

    /// Number of words, counting repeats
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// An immutable collection of lines, addressable by id.
///
/// Clones share the pool, the lines and the id map.
#[derive(Debug, Clone, Default)]
pub struct LineStore {
    pool: Arc<StringPool>,
    lines: Arc<Vec<Line>>,
    by_id: Arc<FxHashMap<LineId, usize>>,
}

impl LineStore {
    /// Tokenize raw records and store them in input order.
    ///
    /// Fails on the first record whose id was already seen.
    pub fn from_records<T: Tokenize + ?Sized>(records: &[LineRecord], tokenizer: &T) -> Result<Self> {
        let tokenized: Vec<Vec<String>> = records
            .par_iter()
            .map(|record| tokenizer.tokenize(&record.text))
            .collect();

        Self::from_tokenized(records.iter().map(|r| r.id).zip(tokenized))
    }

    /// Store already tokenized lines in the given order.
    pub fn from_tokenized<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = (LineId, Vec<S>)>,
        S: AsRef<str>,
    {
        let iter = lines.into_iter();
        let (lower, _) = iter.size_hint();
        let mut pool = StringPool::with_capacity(lower);
        let mut stored = Vec::with_capacity(lower);
        let mut by_id = FxHashMap::with_capacity_and_hasher(lower, Default::default());

        for (index, (id, words)) in iter.enumerate() {
            if by_id.insert(id, index).is_some() {
                return Err(ParadelleError::invalid_record(
                    index,
                    id,
                    "duplicate line id",
                ));
            }
            let words = WordBag::from_words(words.iter().map(|w| pool.intern(w.as_ref())));
            stored.push(Line { id, words });
        }

        Ok(Self {
            pool: Arc::new(pool),
            lines: Arc::new(stored),
            by_id: Arc::new(by_id),
        })
    }

    /// Keep only the lines matching `keep`, preserving order and sharing the pool.
    ///
    /// When every line is kept the result shares this store's lines.
    pub fn retain(&self, mut keep: impl FnMut(&Line) -> bool) -> LineStore {
        let mask: Vec<bool> = self.lines.iter().map(|l| keep(l)).collect();
        if mask.iter().all(|&kept| kept) {
            return self.clone();
        }

        let lines: Vec<Line> = self
            .lines
            .iter()
            .zip(&mask)
            .filter(|(_, kept)| **kept)
            .map(|(line, _)| line.clone())
            .collect();
        let by_id = lines
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id, i))
            .collect();
        Self {
            pool: Arc::clone(&self.pool),
            lines: Arc::new(lines),
            by_id: Arc::new(by_id),
        }
    }

    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.by_id.get(&id).map(|&i| &self.lines[i])
    }

    /// Like [`get`](Self::get), failing with [`ParadelleError::UnknownLine`]
    pub fn line(&self, id: LineId) -> Result<&Line> {
        self.get(id).ok_or_else(|| ParadelleError::unknown_line(id))
    }

    pub fn bag(&self, id: LineId) -> Result<&WordBag> {
        self.line(id).map(|l| &l.words)
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Words of a line in canonical order
    pub fn words(&self, id: LineId) -> Result<Vec<&str>> {
        let line = self.line(id)?;
        Ok(line
            .words
            .as_slice()
            .iter()
            .filter_map(|&w| self.pool.get(w))
            .collect())
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = LineId> + '_ {
        self.lines.iter().map(|l| l.id)
    }

    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
