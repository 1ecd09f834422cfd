//! Exact multiset matching
//!
//! Both matchers share one shape:
//!
//! 1. build a target multiset,
//! 2. generate candidates from the postings of the target's words,
//! 3. prune to candidates that are sub-multisets of the target,
//! 4. enumerate size-`k` combinations whose union equals the target.
//!
//! Step 4 walks combinations in ascending candidate order and backtracks
//! as soon as a partial combination no longer fits into what is left of the
//! target. It reports exactly the combinations a brute-force
//! `C(|candidates|, k)` scan would, each once.
//!
//! - [`stanza`]: two completion lines for a pair of seed lines
//! - [`poem`]: the final lines for three disjoint stanzas

pub mod poem;
pub mod stanza;

use crate::errors::{ParadelleError, Result};
use crate::multiset::WordBag;
use crate::search::cancel::CancelToken;
use crate::search::context::SearchContext;
use crate::types::{LineId, WordId};
use rustc_hash::FxHashMap;

pub use poem::{find_poem_completions, PoemAssembler};
pub use stanza::{find_stanza_completions, StanzaMatcher};

/// Candidates that could take part in a combination equal to `target`.
///
/// Ascending ids, `exclude` removed, every candidate a sub-multiset of
/// `target`.
pub fn prune_candidates(
    ctx: &SearchContext,
    target: &WordBag,
    exclude: &[LineId],
) -> Result<Vec<LineId>> {
    let mut kept = Vec::new();
    for id in ctx.index().candidates(target) {
        if exclude.contains(&id) {
            continue;
        }
        if ctx.bag(id)?.is_submultiset_of(target) {
            kept.push(id);
        }
    }
    Ok(kept)
}

/// Fail when a pruned candidate set outgrows the configured cap
pub(crate) fn check_candidate_limit(count: usize, limit: Option<usize>) -> Result<()> {
    match limit {
        Some(limit) if count > limit => Err(ParadelleError::limit_exceeded(
            "candidate set",
            limit,
            count,
        )),
        _ => Ok(()),
    }
}

/// Every size-`k` combination of `candidates` whose union equals `target`.
///
/// Combinations are returned with ids in candidate order; for ascending
/// candidates the output is lexicographically sorted.
pub fn find_exact_groups(
    ctx: &SearchContext,
    candidates: &[LineId],
    target: &WordBag,
    k: usize,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Vec<LineId>>> {
    if k == 0 || candidates.len() < k {
        return Ok(Vec::new());
    }
    let bags = candidates
        .iter()
        .map(|&id| ctx.bag(id))
        .collect::<Result<Vec<_>>>()?;

    let search = GroupSearch {
        ids: candidates,
        bags,
        k,
        cancel,
    };
    let mut remaining = Remaining::of(target);
    let mut chosen = Vec::with_capacity(k);
    let mut found = Vec::new();
    search.extend(0, &mut chosen, &mut remaining, &mut found)?;
    Ok(found)
}

struct GroupSearch<'a> {
    ids: &'a [LineId],
    bags: Vec<&'a WordBag>,
    k: usize,
    cancel: Option<&'a CancelToken>,
}

impl GroupSearch<'_> {
    fn extend(
        &self,
        start: usize,
        chosen: &mut Vec<usize>,
        remaining: &mut Remaining,
        found: &mut Vec<Vec<LineId>>,
    ) -> Result<()> {
        let depth = chosen.len();
        if depth == self.k {
            if remaining.len == 0 {
                found.push(chosen.iter().map(|&i| self.ids[i]).collect());
            }
            return Ok(());
        }

        let slots = self.k - depth;
        if self.bags.len() < start + slots {
            return Ok(());
        }

        for i in start..=(self.bags.len() - slots) {
            if depth <= 1 {
                if let Some(token) = self.cancel {
                    token.check()?;
                }
            }
            let bag = self.bags[i];
            // The last slot must use up the target exactly.
            let fits_len = if slots == 1 {
                bag.len() == remaining.len
            } else {
                bag.len() <= remaining.len
            };
            if !fits_len || !remaining.fits(bag) {
                continue;
            }

            remaining.take(bag);
            chosen.push(i);
            let result = self.extend(i + 1, chosen, remaining, found);
            chosen.pop();
            remaining.give_back(bag);
            result?;
        }
        Ok(())
    }
}

/// What is left of the target after the words of the chosen lines
struct Remaining {
    counts: FxHashMap<WordId, u32>,
    len: usize,
}

impl Remaining {
    fn of(target: &WordBag) -> Self {
        Self {
            counts: target.counts().clone(),
            len: target.len(),
        }
    }

    fn fits(&self, bag: &WordBag) -> bool {
        bag.counts()
            .iter()
            .all(|(w, &c)| self.counts.get(w).is_some_and(|&left| left >= c))
    }

    fn take(&mut self, bag: &WordBag) {
        for (w, &c) in bag.counts() {
            if let Some(left) = self.counts.get_mut(w) {
                *left -= c;
            }
        }
        self.len -= bag.len();
    }

    fn give_back(&mut self, bag: &WordBag) {
        for (&w, &c) in bag.counts() {
            *self.counts.entry(w).or_insert(0) += c;
        }
        self.len += bag.len();
    }
}
