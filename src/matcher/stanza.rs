//! Stanza completion
//!
//! Given seed lines `a` and `b`, finds every unordered pair `(c, d)` of
//! other lines with `words(c) + words(d) == words(a) + words(b)`.

use super::{check_candidate_limit, find_exact_groups, prune_candidates};
use crate::errors::{ParadelleError, Result};
use crate::multiset::WordBag;
use crate::search::cancel::CancelToken;
use crate::search::context::SearchContext;
use crate::types::LineId;

/// Finds completion pairs for seed pairs
#[derive(Debug, Clone, Default)]
pub struct StanzaMatcher {
    max_candidates: Option<usize>,
    cancel: Option<CancelToken>,
}

impl StanzaMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail a seed pair whose pruned candidate set is larger than `max`
    pub fn with_max_candidates(mut self, max: Option<usize>) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The multiset both sides of the stanza must equal
    pub fn target(ctx: &SearchContext, seed_a: LineId, seed_b: LineId) -> Result<WordBag> {
        Ok(ctx.bag(seed_a)?.union(ctx.bag(seed_b)?))
    }

    /// All completion pairs `(c, d)` with `c < d`, ascending
    pub fn find_completions(
        &self,
        ctx: &SearchContext,
        seed_a: LineId,
        seed_b: LineId,
    ) -> Result<Vec<(LineId, LineId)>> {
        if seed_a == seed_b {
            return Err(ParadelleError::invalid_group(format!(
                "seed lines must differ, got {seed_a} twice"
            )));
        }

        let target = Self::target(ctx, seed_a, seed_b)?;
        let candidates = prune_candidates(ctx, &target, &[seed_a, seed_b])?;
        if candidates.len() < 2 {
            return Ok(Vec::new());
        }
        check_candidate_limit(candidates.len(), self.max_candidates)?;

        let groups = find_exact_groups(ctx, &candidates, &target, 2, self.cancel.as_ref())?;
        Ok(groups.into_iter().map(|g| (g[0], g[1])).collect())
    }
}

/// [`StanzaMatcher::find_completions`] without limits or cancellation
pub fn find_stanza_completions(
    ctx: &SearchContext,
    seed_a: LineId,
    seed_b: LineId,
) -> Result<Vec<(LineId, LineId)>> {
    StanzaMatcher::new().find_completions(ctx, seed_a, seed_b)
}
