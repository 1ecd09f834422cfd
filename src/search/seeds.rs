//! Seed ranking and selection
//!
//! Lines made of frequent words are the likeliest to find completions, so
//! lines are ranked by the mean postings length of their words and only the
//! top `n` are paired off. This bounds the search; it is not needed for
//! correctness.

use crate::search::context::SearchContext;
use crate::types::LineId;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A line and its popularity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedScore {
    pub id: LineId,
    pub popularity: f64,
}

/// Every line of the context, most popular first.
///
/// Ties are broken by ascending id so the ranking is deterministic.
pub fn rank_seeds(ctx: &SearchContext) -> Vec<SeedScore> {
    let index = ctx.index();
    let mut ranked: Vec<SeedScore> = ctx
        .store()
        .lines()
        .par_iter()
        .map(|line| SeedScore {
            id: line.id,
            popularity: index.mean_postings_len(&line.words),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.popularity
            .total_cmp(&a.popularity)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// The seeds chosen for a run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeedSelection {
    pub seeds: Vec<LineId>,
    /// The seed budget asked for
    pub requested: usize,
    /// How many seeds the corpus was short of the budget
    pub shortfall: usize,
}

impl SeedSelection {
    /// Every unordered pair of seeds, `C(n, 2)` in total
    pub fn pairs(&self) -> Vec<(LineId, LineId)> {
        self.seeds
            .iter()
            .copied()
            .tuple_combinations::<(LineId, LineId)>()
            .collect()
    }
}

/// Take the top `budget` seeds, clamping to what is available
pub fn select_seeds(ranked: &[SeedScore], budget: usize) -> SeedSelection {
    let take = budget.min(ranked.len());
    SeedSelection {
        seeds: ranked[..take].iter().map(|s| s.id).collect(),
        requested: budget,
        shortfall: budget - take,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::store::LineStore;

    fn context() -> SearchContext {
        let store = LineStore::from_tokenized(vec![
            (1, vec!["rare", "the"]),
            (2, vec!["the", "cat"]),
            (3, vec!["the", "cat", "sat"]),
            (4, vec!["cat", "the"]),
            (5, vec!["sat", "rare"]),
        ])
        .unwrap();
        SearchContext::new(store)
    }

    #[test]
    fn test_rank_by_mean_postings_len() {
        // the:4 cat:3 sat:2 rare:2
        let ranked = rank_seeds(&context());
        let ids: Vec<_> = ranked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3, 5]);
        assert!((ranked[0].popularity - 3.5).abs() < 1e-10);
        assert!((ranked[2].popularity - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_pair_count_is_n_choose_two() {
        let ranked = rank_seeds(&context());
        assert_eq!(select_seeds(&ranked, 2).pairs().len(), 1);
        assert_eq!(select_seeds(&ranked, 5).pairs().len(), 10);
    }

    #[test]
    fn test_budget_clamped_with_shortfall() {
        let ranked = rank_seeds(&context());
        let selection = select_seeds(&ranked, 8);
        assert_eq!(selection.seeds.len(), 5);
        assert_eq!(selection.requested, 8);
        assert_eq!(selection.shortfall, 3);
    }

    #[test]
    fn test_pairs_are_unordered_and_unique() {
        let selection = SeedSelection {
            seeds: vec![7, 3, 5],
            requested: 3,
            shortfall: 0,
        };
        assert_eq!(selection.pairs(), vec![(7, 3), (7, 5), (3, 5)]);
    }
}
