//! Top-level entry point
//!
//! [`Paradeller`] ties the stages together: tokenize the records, reduce the
//! corpus (or reuse a [`PreparedCorpus`]), search, and bundle the results
//! with run metadata. Everything runs inside one thread pool sized by the
//! config.

use super::cancel::CancelToken;
use super::context::SearchContext;
use super::orchestrator::SearchOrchestrator;
use super::results::{now_ms, RunMeta, SearchResults};
use super::STAGE_PREPARE;
use crate::corpus::{LineStore, PreparedCorpus};
use crate::errors::Result;
use crate::nlp::tokenizer::{Tokenize, Tokenizer};
use crate::reduce::{CorpusReducer, DuplicatesMap, Reduction};
use crate::types::{DataSource, LineRecord, SearchConfig};
use tracing::{debug, info, warn};

/// Runs paradelle searches with one configuration and tokenizer
#[derive(Debug, Clone)]
pub struct Paradeller<T: Tokenize = Tokenizer> {
    config: SearchConfig,
    tokenizer: T,
    cancel: CancelToken,
}

impl Paradeller<Tokenizer> {
    /// Validate `config` and use the default tokenizer
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tokenizer: Tokenizer::new(),
            cancel: CancelToken::new(),
        })
    }
}

impl<T: Tokenize> Paradeller<T> {
    /// Replace the tokenizer
    pub fn with_tokenizer<U: Tokenize>(self, tokenizer: U) -> Paradeller<U> {
        Paradeller {
            config: self.config,
            tokenizer,
            cancel: self.cancel,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// A handle that interrupts searches started by this runner
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Tokenize and reduce `records` into a reusable snapshot
    pub fn prepare(&self, records: &[LineRecord]) -> Result<PreparedCorpus> {
        self.config.scoped(|| {
            let reduction = self.reduce(records)?;
            Ok(PreparedCorpus::from_reduction(&reduction, &self.config, &self.tokenizer))
        })?
    }

    /// Search a previously prepared corpus
    pub fn search(&self, corpus: &PreparedCorpus) -> Result<SearchResults> {
        let started_at_ms = now_ms();
        self.config
            .scoped(|| self.search_cached(corpus, started_at_ms))?
    }

    /// Full run honoring the configured [`DataSource`].
    ///
    /// With [`DataSource::Cached`], `cached` is searched after a parameter
    /// check; without one the run falls back to a fresh reduction of
    /// `records`.
    pub fn run(
        &self,
        records: &[LineRecord],
        cached: Option<&PreparedCorpus>,
    ) -> Result<SearchResults> {
        let started_at_ms = now_ms();
        self.config.scoped(|| match (self.config.data_source, cached) {
            (DataSource::Cached, Some(corpus)) => self.search_cached(corpus, started_at_ms),
            (DataSource::Cached, None) => {
                warn!("no prepared corpus supplied for a cached run, reducing afresh");
                self.search_fresh(records, started_at_ms)
            }
            (DataSource::Fresh, cached) => {
                if cached.is_some() {
                    debug!("fresh run, ignoring the prepared corpus");
                }
                self.search_fresh(records, started_at_ms)
            }
        })?
    }

    fn reduce(&self, records: &[LineRecord]) -> Result<Reduction> {
        trace_stage!(STAGE_PREPARE);
        self.cancel.check()?;
        let store = LineStore::from_records(records, &self.tokenizer)?;
        Ok(CorpusReducer::from_config(&self.config).reduce(store))
    }

    fn search_fresh(&self, records: &[LineRecord], started_at_ms: u64) -> Result<SearchResults> {
        let reduction = self.reduce(records)?;
        let duplicates = reduction.duplicates.clone();
        let ctx = SearchContext::from(reduction);
        self.search_context(&ctx, duplicates, records.len(), DataSource::Fresh, started_at_ms)
    }

    fn search_cached(&self, corpus: &PreparedCorpus, started_at_ms: u64) -> Result<SearchResults> {
        corpus.check_compatible(&self.config, &self.tokenizer)?;
        let ctx = corpus.to_context()?;
        self.search_context(
            &ctx,
            corpus.duplicates.clone(),
            corpus.input_lines,
            DataSource::Cached,
            started_at_ms,
        )
    }

    fn search_context(
        &self,
        ctx: &SearchContext,
        duplicates: DuplicatesMap,
        input_lines: usize,
        data_source: DataSource,
        started_at_ms: u64,
    ) -> Result<SearchResults> {
        let stats = ctx.stats();
        info!(
            lines = stats.lines,
            distinct_words = stats.distinct_words,
            total_words = stats.total_words,
            mean_postings_len = stats.mean_postings_len,
            ?data_source,
            "search context ready"
        );

        let outcome = SearchOrchestrator::new(ctx, &self.config)
            .with_cancel(self.cancel.clone())
            .run_in_current_pool()?;

        let meta = RunMeta {
            started_at_ms,
            finished_at_ms: now_ms(),
            data_source,
            seed_budget: self.config.seed_budget,
            seeds_used: outcome.seeds.seeds.len(),
            seed_shortfall: outcome.seeds.shortfall,
            input_lines,
            reduced_lines: ctx.len(),
            seed_pairs_searched: outcome.seed_pairs_searched,
            stanza_groups_searched: outcome.stanza_groups_searched,
            failed_units: outcome.failed_units,
            incomplete: outcome.failed_units > 0,
        };
        info!(
            stanzas = outcome.stanzas.len(),
            poems = outcome.poems.len(),
            elapsed_ms = meta.finished_at_ms.saturating_sub(meta.started_at_ms),
            incomplete = meta.incomplete,
            "search finished"
        );

        Ok(SearchResults {
            stanzas: outcome.stanzas,
            poems: outcome.poems,
            duplicates,
            meta,
        })
    }
}
