//! Search orchestration
//!
//! - [`context`]: the immutable [`SearchContext`] shared by all work units
//! - [`seeds`]: popularity ranking and seed selection
//! - [`orchestrator`]: fans seed pairs and stanza triples out to the matchers
//! - [`runner`]: the [`Paradeller`] entry point, from records to results
//! - [`results`]: the serializable [`SearchResults`] bundle
//! - [`cancel`]: cooperative batch interruption

pub mod cancel;
pub mod context;
pub mod orchestrator;
pub mod results;
pub mod runner;
pub mod seeds;

pub use cancel::CancelToken;
pub use context::{CorpusStats, SearchContext};
pub use orchestrator::{SearchOrchestrator, SearchOutcome};
pub use results::{RunMeta, SearchResults};
pub use runner::Paradeller;
pub use seeds::{rank_seeds, select_seeds, SeedScore, SeedSelection};

/// Tokenizing and reducing the input records
pub const STAGE_PREPARE: &str = "prepare";
/// Ranking and selecting seed lines
pub const STAGE_SEEDS: &str = "seed_selection";
/// Completing seed pairs into stanzas
pub const STAGE_STANZAS: &str = "stanza_search";
/// Completing stanza triples into poems
pub const STAGE_POEMS: &str = "poem_search";
