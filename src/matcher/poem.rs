//! Poem completion
//!
//! Given three line-disjoint stanzas, finds every group of `k` further lines
//! whose combined words equal the combined words of the six completion lines.

use super::{check_candidate_limit, find_exact_groups, prune_candidates};
use crate::errors::{ParadelleError, Result};
use crate::multiset::WordBag;
use crate::search::cancel::CancelToken;
use crate::search::context::SearchContext;
use crate::types::{LineId, Stanza};

/// Finds final-stanza line groups for stanza triples
#[derive(Debug, Clone)]
pub struct PoemAssembler {
    final_lines: usize,
    max_candidates: Option<usize>,
    cancel: Option<CancelToken>,
}

impl Default for PoemAssembler {
    fn default() -> Self {
        Self::new(6)
    }
}

impl PoemAssembler {
    /// Assembler for a final stanza of `final_lines` lines
    pub fn new(final_lines: usize) -> Self {
        Self {
            final_lines,
            max_candidates: None,
            cancel: None,
        }
    }

    /// Fail a triple whose pruned candidate set is larger than `max`
    pub fn with_max_candidates(mut self, max: Option<usize>) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn final_lines(&self) -> usize {
        self.final_lines
    }

    /// Union of the completion lines of all three stanzas
    pub fn target(ctx: &SearchContext, stanzas: &[Stanza; 3]) -> Result<WordBag> {
        let bags = stanzas
            .iter()
            .flat_map(|s| s.completions)
            .map(|id| ctx.bag(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(WordBag::union_all(bags))
    }

    /// All final line groups, each ascending, in ascending order.
    ///
    /// The twelve stanza lines must be pairwise distinct.
    pub fn find_completions(
        &self,
        ctx: &SearchContext,
        stanzas: &[Stanza; 3],
    ) -> Result<Vec<Vec<LineId>>> {
        if !Stanza::group_is_disjoint(stanzas) {
            return Err(ParadelleError::invalid_group(
                "stanzas must use twelve distinct lines",
            ));
        }

        let target = Self::target(ctx, stanzas)?;
        let used: Vec<LineId> = stanzas.iter().flat_map(|s| s.ids()).collect();
        let candidates = prune_candidates(ctx, &target, &used)?;
        if candidates.len() < self.final_lines {
            return Ok(Vec::new());
        }
        check_candidate_limit(candidates.len(), self.max_candidates)?;

        find_exact_groups(
            ctx,
            &candidates,
            &target,
            self.final_lines,
            self.cancel.as_ref(),
        )
    }
}

/// [`PoemAssembler::find_completions`] without limits or cancellation
pub fn find_poem_completions(
    ctx: &SearchContext,
    first: &Stanza,
    second: &Stanza,
    third: &Stanza,
    final_lines: usize,
) -> Result<Vec<Vec<LineId>>> {
    PoemAssembler::new(final_lines).find_completions(ctx, &[*first, *second, *third])
}
