//! Core types for rapid_paradelle
//!
//! This module defines the fundamental data structures used throughout the library,
//! including word interning, line records, stanzas, poems, and configuration.

use crate::errors::{ParadelleError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Externally assigned identifier of a corpus line.
pub type LineId = u64;

/// Interned identifier of a word within a [`StringPool`].
pub type WordId = u32;

// ============================================================================
// String Interning
// ============================================================================

/// A pool for string interning to reduce memory usage and enable fast comparisons.
///
/// Every distinct word in the corpus is stored once; lines hold [`WordId`]s,
/// so multiset comparisons never touch string data.
#[derive(Debug, Default, Clone)]
pub struct StringPool {
    /// Maps strings to their interned IDs
    string_to_id: FxHashMap<Arc<str>, WordId>,
    /// Maps IDs back to strings
    id_to_string: Vec<Arc<str>>,
}

impl StringPool {
    /// Create a new empty string pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a string pool with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            string_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            id_to_string: Vec::with_capacity(capacity),
        }
    }

    /// Intern a string, returning its ID
    pub fn intern(&mut self, s: &str) -> WordId {
        if let Some(&id) = self.string_to_id.get(s) {
            return id;
        }

        let id = self.id_to_string.len() as WordId;
        let arc: Arc<str> = s.into();
        self.string_to_id.insert(arc.clone(), id);
        self.id_to_string.push(arc);
        id
    }

    /// Look up the ID of an already interned string
    pub fn lookup(&self, s: &str) -> Option<WordId> {
        self.string_to_id.get(s).copied()
    }

    /// Get a string by its ID
    pub fn get(&self, id: WordId) -> Option<&str> {
        self.id_to_string.get(id as usize).map(|s| s.as_ref())
    }

    /// Get the number of unique strings in the pool
    pub fn len(&self) -> usize {
        self.id_to_string.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.id_to_string.is_empty()
    }
}

// ============================================================================
// Input records
// ============================================================================

/// A raw corpus entry as delivered by an external loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: LineId,
    pub text: String,
}

impl LineRecord {
    pub fn new(id: LineId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

// ============================================================================
// Stanza & Poem
// ============================================================================

/// Two seed lines and two completion lines whose words balance the seeds'.
///
/// Rendered, the seeds are repeated: `a a b b c d`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Stanza {
    /// Seed lines `(a, b)`
    pub seeds: [LineId; 2],
    /// Completion lines `(c, d)`
    pub completions: [LineId; 2],
}

impl Stanza {
    /// Create a stanza from its seed pair and completion pair
    pub fn new(seeds: (LineId, LineId), completions: (LineId, LineId)) -> Self {
        Self {
            seeds: [seeds.0, seeds.1],
            completions: [completions.0, completions.1],
        }
    }

    /// All four line ids, seeds first
    pub fn ids(&self) -> [LineId; 4] {
        [
            self.seeds[0],
            self.seeds[1],
            self.completions[0],
            self.completions[1],
        ]
    }

    /// The six-line layout of the rendered stanza
    pub fn layout(&self) -> [LineId; 6] {
        let [a, b] = self.seeds;
        let [c, d] = self.completions;
        [a, a, b, b, c, d]
    }

    /// Same stanza with each pair in ascending order
    pub fn canonical(&self) -> Self {
        let mut seeds = self.seeds;
        let mut completions = self.completions;
        seeds.sort_unstable();
        completions.sort_unstable();
        Self { seeds, completions }
    }

    /// True when all four ids are distinct
    pub fn is_disjoint(&self) -> bool {
        let mut ids = self.ids();
        ids.sort_unstable();
        ids.windows(2).all(|w| w[0] != w[1])
    }

    /// True when no line appears in both stanzas
    pub fn is_disjoint_from(&self, other: &Stanza) -> bool {
        let theirs = other.ids();
        self.ids().iter().all(|id| !theirs.contains(id))
    }

    /// True when the twelve ids of three stanzas are pairwise distinct
    pub fn group_is_disjoint(group: &[Stanza; 3]) -> bool {
        let mut ids = [0; 12];
        for (slot, stanza) in ids.chunks_exact_mut(4).zip(group.iter()) {
            slot.copy_from_slice(&stanza.ids());
        }
        ids.sort_unstable();
        ids.windows(2).all(|w| w[0] != w[1])
    }
}

/// Three line-disjoint stanzas and the final lines that balance their
/// completion lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Poem {
    pub stanzas: [Stanza; 3],
    pub final_lines: Vec<LineId>,
}

impl Poem {
    pub fn new(stanzas: [Stanza; 3], final_lines: Vec<LineId>) -> Self {
        Self {
            stanzas,
            final_lines,
        }
    }

    /// Same poem with canonical stanzas in ascending order and sorted final lines
    pub fn canonical(&self) -> Self {
        let mut stanzas = self.stanzas.map(|s| s.canonical());
        stanzas.sort_unstable();
        let mut final_lines = self.final_lines.clone();
        final_lines.sort_unstable();
        Self {
            stanzas,
            final_lines,
        }
    }

    /// Every line id used by the poem, stanzas first
    pub fn line_ids(&self) -> Vec<LineId> {
        self.stanzas
            .iter()
            .flat_map(|s| s.ids())
            .chain(self.final_lines.iter().copied())
            .collect()
    }

    /// True when no line id is used twice anywhere in the poem
    pub fn is_disjoint(&self) -> bool {
        let mut ids = self.line_ids();
        ids.sort_unstable();
        ids.windows(2).all(|w| w[0] != w[1])
    }
}

// ============================================================================
// Policies
// ============================================================================

/// Whether the reduced corpus is rebuilt or a prior reduction is reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Tokenize and reduce the input records
    #[default]
    Fresh,
    /// Reuse a previously prepared corpus
    Cached,
}

/// Strength of the connectivity ("oddball") filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddballPolicy {
    /// Remove lines holding a word that appears in fewer than 3 lines
    #[default]
    Standard,
    /// Also require `total_count(w) - m >= 2 * m` for every word `w` of
    /// multiplicity `m` in a line
    Strict,
}

/// What happens when a single search unit fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole batch on the first failed unit
    #[default]
    FailFast,
    /// Drop failed units, log them, and mark the result incomplete
    SkipAndLog,
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a paradelle search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Number of top-ranked seed lines to pair off
    pub seed_budget: usize,
    /// Minimum number of words for a line to survive reduction
    pub min_tokens: usize,
    /// Number of lines in the final stanza
    pub final_stanza_lines: usize,
    /// Rebuild or reuse the reduced corpus
    pub data_source: DataSource,
    /// Connectivity filter strength
    pub oddball_policy: OddballPolicy,
    /// Batch behaviour on a failed work unit
    pub failure_policy: FailurePolicy,
    /// Maximum pruned candidates per work unit before it fails
    pub max_candidates: Option<usize>,
    /// Maximum number of Rayon threads for parallel work.
    /// `None` uses Rayon's default (all logical cores).
    pub max_threads: Option<usize>,
    /// Disable parallelism entirely (equivalent to `max_threads: 1`).
    /// When `true`, overrides `max_threads`.
    pub single_thread: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed_budget: 100,
            min_tokens: 3,
            final_stanza_lines: 6,
            data_source: DataSource::Fresh,
            oddball_policy: OddballPolicy::Standard,
            failure_policy: FailurePolicy::FailFast,
            max_candidates: None,
            max_threads: None,
            single_thread: false,
        }
    }
}

impl SearchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.seed_budget < 2 {
            return Err(ParadelleError::invalid_config(format!(
                "seed_budget must be >= 2 to form a seed pair, got {}",
                self.seed_budget
            )));
        }

        if self.min_tokens == 0 {
            return Err(ParadelleError::invalid_config("min_tokens must be > 0"));
        }

        if self.final_stanza_lines == 0 {
            return Err(ParadelleError::invalid_config(
                "final_stanza_lines must be > 0",
            ));
        }

        if self.max_threads == Some(0) {
            return Err(ParadelleError::invalid_config("max_threads must be > 0"));
        }

        if self.max_candidates.is_some_and(|m| m < 2) {
            return Err(ParadelleError::invalid_config(
                "max_candidates must be >= 2 when set",
            ));
        }

        Ok(())
    }

    /// Builder method: set seed budget
    pub fn with_seed_budget(mut self, seed_budget: usize) -> Self {
        self.seed_budget = seed_budget;
        self
    }

    /// Builder method: set minimum tokens per line
    pub fn with_min_tokens(mut self, min_tokens: usize) -> Self {
        self.min_tokens = min_tokens;
        self
    }

    /// Builder method: set final stanza size
    pub fn with_final_stanza_lines(mut self, lines: usize) -> Self {
        self.final_stanza_lines = lines;
        self
    }

    /// Builder method: set data source
    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_source = source;
        self
    }

    /// Builder method: set oddball policy
    pub fn with_oddball_policy(mut self, policy: OddballPolicy) -> Self {
        self.oddball_policy = policy;
        self
    }

    /// Builder method: set failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Builder method: set per-unit candidate cap
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Builder method: set maximum worker threads
    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = Some(max);
        self
    }

    /// Builder method: run everything on one thread
    pub fn with_single_thread(mut self, single_thread: bool) -> Self {
        self.single_thread = single_thread;
        self
    }

    /// Resolve the effective thread count.
    ///
    /// - `single_thread == true` → `Some(1)`
    /// - `max_threads == Some(n)` → `Some(n)`
    /// - otherwise → `None` (use Rayon default)
    pub fn effective_threads(&self) -> Option<usize> {
        if self.single_thread {
            Some(1)
        } else {
            self.max_threads
        }
    }

    /// Build a scoped Rayon thread pool matching this config.
    ///
    /// Returns `None` when no thread limit is set (use global pool).
    pub fn build_thread_pool(&self) -> Result<Option<rayon::ThreadPool>> {
        self.effective_threads()
            .map(|n| rayon::ThreadPoolBuilder::new().num_threads(n).build())
            .transpose()
            .map_err(ParadelleError::from)
    }

    /// Execute `f` within a scoped Rayon thread pool matching this config.
    ///
    /// If no thread limit is set, `f` runs directly (using the global pool).
    /// Otherwise, a custom pool is created and `f` runs inside
    /// [`rayon::ThreadPool::install`], so any `par_iter()` within `f`
    /// uses the scoped pool.
    pub fn scoped<R: Send>(&self, f: impl FnOnce() -> R + Send) -> Result<R> {
        Ok(match self.build_thread_pool()? {
            Some(pool) => pool.install(f),
            None => f(),
        })
    }
}
