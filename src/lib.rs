//! # rapid_paradelle
//!
//! Exact word-multiset search for assembling paradelles from a corpus of
//! short lines.
//!
//! A paradelle stanza repeats two seed lines and closes with two lines that
//! use exactly the seeds' words, each as often as the seeds do. The final
//! stanza uses exactly the words of every closing line before it. This crate
//! finds such line combinations in a corpus:
//!
//! 1. tokenize every line into a word multiset,
//! 2. reduce the corpus to lines that could take part in a match,
//! 3. search seed pairs for stanza completions,
//! 4. search line-disjoint stanza triples for final stanzas.
//!
//! ## Example
//!
//! ```
//! use rapid_paradelle::{LineRecord, Paradeller, SearchConfig};
//!
//! let records = vec![
//!     LineRecord::new(1, "the cold wind"),
//!     LineRecord::new(2, "a dark night"),
//! ];
//! let runner = Paradeller::new(SearchConfig::default()).unwrap();
//! let results = runner.run(&records, None).unwrap();
//! assert!(results.stanzas.is_empty());
//! ```

/// Enter a tracing span for a search stage.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("search_stage", stage = $name).entered();
    };
}

pub mod corpus;
pub mod errors;
pub mod index;
pub mod matcher;
pub mod multiset;
pub mod nlp;
pub mod reduce;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use errors::{ParadelleError, Result};
pub use types::{
    DataSource, FailurePolicy, LineId, LineRecord, OddballPolicy, Poem, SearchConfig, Stanza,
    StringPool, WordId,
};

// Re-export main functionality
pub use corpus::{Line, LineStore, PreparedCorpus, PreparedLine};
pub use index::InvertedIndex;
pub use matcher::{find_poem_completions, find_stanza_completions, PoemAssembler, StanzaMatcher};
pub use multiset::WordBag;
pub use nlp::tokenizer::{Tokenize, Tokenizer};
pub use reduce::{CorpusReducer, DuplicatesMap, Reduction, ReductionReport};
pub use search::{
    CancelToken, CorpusStats, Paradeller, RunMeta, SearchContext, SearchOrchestrator,
    SearchResults,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
