//! Search orchestration
//!
//! Drives a full search over a prepared [`SearchContext`]:
//!
//! 1. rank lines by popularity and take the top `seed_budget` as seeds,
//! 2. fan every seed pair out to the [`StanzaMatcher`],
//! 3. with three or more stanzas, fan every line-disjoint stanza triple out
//!    to the [`PoemAssembler`],
//! 4. canonicalize, sort and dedup both result sets.
//!
//! Work units are pure functions of the shared context and their input, and
//! results are collected in input order. A unit that fails aborts the batch
//! or is skipped, depending on the configured [`FailurePolicy`]. Stanza
//! triples are generated lazily inside the poem tasks.

use super::cancel::CancelToken;
use super::context::SearchContext;
use super::seeds::{rank_seeds, select_seeds, SeedSelection};
use super::{STAGE_POEMS, STAGE_SEEDS, STAGE_STANZAS};
use crate::errors::{ParadelleError, Result};
use crate::matcher::{PoemAssembler, StanzaMatcher};
use crate::types::{FailurePolicy, LineId, Poem, SearchConfig, Stanza};
use itertools::Itertools;
use rayon::prelude::*;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Output of one fanned-out stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput<T> {
    /// Results of the units that succeeded, in unit order
    pub found: Vec<T>,
    /// Units submitted
    pub units: usize,
    /// Units dropped under [`FailurePolicy::SkipAndLog`]
    pub failed: usize,
}

impl<T> Default for BatchOutput<T> {
    fn default() -> Self {
        Self {
            found: Vec::new(),
            units: 0,
            failed: 0,
        }
    }
}

/// Consolidated output of a search
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOutcome {
    pub stanzas: Vec<Stanza>,
    pub poems: Vec<Poem>,
    pub seeds: SeedSelection,
    pub seed_pairs_searched: usize,
    pub stanza_groups_searched: usize,
    pub failed_units: usize,
}

/// Runs the seed, stanza and poem stages over one context
#[derive(Debug, Clone)]
pub struct SearchOrchestrator<'a> {
    ctx: &'a SearchContext,
    config: &'a SearchConfig,
    cancel: CancelToken,
}

impl<'a> SearchOrchestrator<'a> {
    pub fn new(ctx: &'a SearchContext, config: &'a SearchConfig) -> Self {
        Self {
            ctx,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the whole search inside a thread pool sized by the config
    pub fn run(&self) -> Result<SearchOutcome> {
        self.config.scoped(|| self.run_in_current_pool())?
    }

    /// Run the whole search on whatever rayon pool is current
    pub(crate) fn run_in_current_pool(&self) -> Result<SearchOutcome> {
        self.cancel.check()?;

        let seeds = {
            trace_stage!(STAGE_SEEDS);
            let ranked = rank_seeds(self.ctx);
            let seeds = select_seeds(&ranked, self.config.seed_budget);
            if seeds.shortfall > 0 {
                warn!(
                    requested = seeds.requested,
                    available = ranked.len(),
                    "seed budget exceeds the reduced corpus, clamping"
                );
            }
            seeds
        };

        let pairs = seeds.pairs();
        let stanza_batch = {
            trace_stage!(STAGE_STANZAS);
            self.search_stanzas(&pairs)?
        };
        let stanzas = consolidate_stanzas(stanza_batch.found);
        info!(
            seeds = seeds.seeds.len(),
            pairs = pairs.len(),
            stanzas = stanzas.len(),
            "stanza search finished"
        );

        let poem_batch = if stanzas.len() < 3 {
            debug!(stanzas = stanzas.len(), "too few stanzas for a poem");
            BatchOutput::default()
        } else {
            trace_stage!(STAGE_POEMS);
            self.search_poems(&stanzas)?
        };
        let poems = consolidate_poems(poem_batch.found);
        info!(
            groups = poem_batch.units,
            poems = poems.len(),
            "poem search finished"
        );

        Ok(SearchOutcome {
            stanzas,
            poems,
            seeds,
            seed_pairs_searched: stanza_batch.units,
            stanza_groups_searched: poem_batch.units,
            failed_units: stanza_batch.failed + poem_batch.failed,
        })
    }

    /// One stanza per completion pair of every seed pair
    pub fn search_stanzas(&self, pairs: &[(LineId, LineId)]) -> Result<BatchOutput<Stanza>> {
        let batch = Batch::new(STAGE_STANZAS, self.config.failure_policy, &self.cancel);
        let matcher = StanzaMatcher::new()
            .with_max_candidates(self.config.max_candidates)
            .with_cancel(batch.cancel.clone());

        let outputs = pairs
            .par_iter()
            .map(|pair| -> Result<BatchOutput<Stanza>> {
                let mut out = BatchOutput::default();
                batch.run_unit(pair, &mut out, |&(a, b)| {
                    let completions = matcher.find_completions(self.ctx, a, b)?;
                    Ok(completions
                        .into_iter()
                        .map(|(c, d)| Stanza::new((a, b), (c, d)))
                        .collect())
                })?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>();
        batch.finish(outputs)
    }

    /// One poem per final line group of every line-disjoint stanza triple
    pub fn search_poems(&self, stanzas: &[Stanza]) -> Result<BatchOutput<Poem>> {
        let batch = Batch::new(STAGE_POEMS, self.config.failure_policy, &self.cancel);
        let assembler = PoemAssembler::new(self.config.final_stanza_lines)
            .with_max_candidates(self.config.max_candidates)
            .with_cancel(batch.cancel.clone());

        self.for_each_group(batch, stanzas, |group| {
            let finals = assembler.find_completions(self.ctx, group)?;
            Ok(finals
                .into_iter()
                .map(|lines| Poem::new(*group, lines))
                .collect())
        })
    }

    /// Triples are generated per first stanza inside each rayon task and
    /// never materialized as a whole.
    fn for_each_group<O, F>(
        &self,
        batch: Batch<'_>,
        stanzas: &[Stanza],
        work: F,
    ) -> Result<BatchOutput<O>>
    where
        O: Send,
        F: Fn(&[Stanza; 3]) -> Result<Vec<O>> + Sync,
    {
        let outputs = (0..stanzas.len())
            .into_par_iter()
            .map(|first| -> Result<BatchOutput<O>> {
                let mut out = BatchOutput::default();
                for group in groups_starting_at(stanzas, first) {
                    batch.run_unit(&group, &mut out, &work)?;
                }
                Ok(out)
            })
            .collect::<Result<Vec<_>>>();
        batch.finish(outputs)
    }
}

/// Failure bookkeeping for one fanned-out stage.
///
/// Units run under a child of the search token. Under
/// [`FailurePolicy::FailFast`] the first failure is recorded and the child
/// token cancelled, so units already in flight stop at their next check.
struct Batch<'s> {
    stage: &'s str,
    policy: FailurePolicy,
    cancel: CancelToken,
    failure: Mutex<Option<ParadelleError>>,
}

impl<'s> Batch<'s> {
    fn new(stage: &'s str, policy: FailurePolicy, parent: &CancelToken) -> Self {
        Self {
            stage,
            policy,
            cancel: parent.child(),
            failure: Mutex::new(None),
        }
    }

    /// Run one unit and fold its output into `out`
    fn run_unit<I, O>(
        &self,
        unit: &I,
        out: &mut BatchOutput<O>,
        work: impl FnOnce(&I) -> Result<Vec<O>>,
    ) -> Result<()>
    where
        I: Debug,
    {
        out.units += 1;
        match self.cancel.check().and_then(|()| work(unit)) {
            Ok(found) => {
                out.found.extend(found);
                Ok(())
            }
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => match self.policy {
                FailurePolicy::FailFast => {
                    self.fail(unit_failure(self.stage, unit, err));
                    Err(ParadelleError::Cancelled)
                }
                FailurePolicy::SkipAndLog => {
                    out.failed += 1;
                    warn!(stage = self.stage, unit = ?unit, error = %err, "skipping failed work unit");
                    Ok(())
                }
            },
        }
    }

    fn fail(&self, err: ParadelleError) {
        let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
        self.cancel.cancel();
    }

    /// Merge per-task outputs in task order. A recorded failure wins over
    /// the cancellations it caused.
    fn finish<O>(self, outputs: Result<Vec<BatchOutput<O>>>) -> Result<BatchOutput<O>> {
        if let Some(err) = self
            .failure
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            return Err(err);
        }
        Ok(outputs?
            .into_iter()
            .fold(BatchOutput::default(), |mut acc, out| {
                acc.found.extend(out.found);
                acc.units += out.units;
                acc.failed += out.failed;
                acc
            }))
    }
}

fn unit_failure(stage: &str, unit: &impl Debug, err: ParadelleError) -> ParadelleError {
    ParadelleError::worker_failed(format!("{stage} unit {unit:?}"), err.to_string())
}

/// Line-disjoint triples whose lowest position in `stanzas` is `first`
fn groups_starting_at(
    stanzas: &[Stanza],
    first: usize,
) -> impl Iterator<Item = [Stanza; 3]> + '_ {
    let head = stanzas[first];
    stanzas[first + 1..]
        .iter()
        .copied()
        .filter(move |s| head.is_disjoint_from(s))
        .tuple_combinations::<(Stanza, Stanza)>()
        .map(move |(y, z)| [head, y, z])
        .filter(Stanza::group_is_disjoint)
}

/// Every 3-combination of `stanzas` using twelve distinct lines, lazily
pub fn stanza_groups(stanzas: &[Stanza]) -> impl Iterator<Item = [Stanza; 3]> + '_ {
    (0..stanzas.len()).flat_map(move |first| groups_starting_at(stanzas, first))
}

/// Canonicalize, sort and dedup stanzas
pub fn consolidate_stanzas(stanzas: Vec<Stanza>) -> Vec<Stanza> {
    let mut stanzas: Vec<Stanza> = stanzas.iter().map(Stanza::canonical).collect();
    stanzas.sort_unstable();
    stanzas.dedup();
    stanzas
}

/// Canonicalize, sort and dedup poems
pub fn consolidate_poems(poems: Vec<Poem>) -> Vec<Poem> {
    let mut poems: Vec<Poem> = poems.iter().map(Poem::canonical).collect();
    poems.sort_unstable();
    poems.dedup();
    poems
}
