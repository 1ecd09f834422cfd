//! Corpus reduction
//!
//! Shrinks the corpus to lines that can, in principle, take part in a match.
//! One pass applies, in order:
//!
//! 1. the length filter ([`filters::filter_short`]),
//! 2. the duplicate filter ([`dedup::filter_duplicates`]),
//! 3. the connectivity filter ([`filters::filter_oddballs`]) against a freshly
//!    built index.
//!
//! Passes repeat until one removes nothing. The line count strictly decreases
//! on every pass that does not terminate the loop, so the loop is bounded by
//! the input size.

pub mod dedup;
pub mod filters;

use crate::corpus::store::LineStore;
use crate::index::InvertedIndex;
use crate::types::{OddballPolicy, SearchConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use dedup::{DuplicateGroups, DuplicatesMap};

/// Lines removed by each filter during one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassReport {
    pub pass: usize,
    pub short: usize,
    pub duplicates: usize,
    pub oddballs: usize,
}

impl PassReport {
    pub fn removed(&self) -> usize {
        self.short + self.duplicates + self.oddballs
    }
}

/// Summary of a full reduction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReductionReport {
    pub input_lines: usize,
    pub output_lines: usize,
    pub passes: Vec<PassReport>,
}

/// The reduced corpus, its index and the duplicates found on the way
#[derive(Debug, Clone)]
pub struct Reduction {
    pub store: LineStore,
    pub index: InvertedIndex,
    pub duplicates: DuplicatesMap,
    pub report: ReductionReport,
}

/// Runs the filter set to a fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusReducer {
    min_tokens: usize,
    oddball_policy: OddballPolicy,
}

impl Default for CorpusReducer {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl CorpusReducer {
    pub fn new(min_tokens: usize) -> Self {
        Self {
            min_tokens,
            oddball_policy: OddballPolicy::Standard,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            min_tokens: config.min_tokens,
            oddball_policy: config.oddball_policy,
        }
    }

    pub fn with_oddball_policy(mut self, policy: OddballPolicy) -> Self {
        self.oddball_policy = policy;
        self
    }

    pub fn min_tokens(&self) -> usize {
        self.min_tokens
    }

    pub fn oddball_policy(&self) -> OddballPolicy {
        self.oddball_policy
    }

    /// Reduce `store` until a pass removes no line
    pub fn reduce(&self, store: LineStore) -> Reduction {
        let input_lines = store.len();
        let mut groups = DuplicateGroups::new();
        let mut passes = Vec::new();
        let mut current = store;

        loop {
            let (next, report) = self.run_pass(&current, &mut groups, passes.len() + 1);
            debug!(
                pass = report.pass,
                short = report.short,
                duplicates = report.duplicates,
                oddballs = report.oddballs,
                remaining = next.len(),
                "reduction pass"
            );
            passes.push(report);
            current = next;
            if report.removed() == 0 {
                break;
            }
        }

        let index = InvertedIndex::build(&current);
        let duplicates = groups.report(&current);
        info!(
            input_lines,
            output_lines = current.len(),
            passes = passes.len(),
            words = index.word_count(),
            "corpus reduced"
        );

        Reduction {
            report: ReductionReport {
                input_lines,
                output_lines: current.len(),
                passes,
            },
            store: current,
            index,
            duplicates,
        }
    }

    /// Apply the three filters once
    pub fn run_pass(
        &self,
        store: &LineStore,
        groups: &mut DuplicateGroups,
        pass: usize,
    ) -> (LineStore, PassReport) {
        let (store, short) = filters::filter_short(store, self.min_tokens);
        let (store, duplicates) = dedup::filter_duplicates(&store, groups);
        let index = InvertedIndex::build(&store);
        let (store, oddballs) = filters::filter_oddballs(&store, &index, self.oddball_policy);

        (
            store,
            PassReport {
                pass,
                short,
                duplicates,
                oddballs,
            },
        )
    }
}
