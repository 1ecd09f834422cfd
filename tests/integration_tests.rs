//! Integration tests for rapid_paradelle

use rapid_paradelle::*;

/// Three stanzas over disjoint vocabularies, a final stanza for them, and
/// lines the reducer must remove.
fn sample_records() -> Vec<LineRecord> {
    vec![
        LineRecord::new(1, "red sun"),
        LineRecord::new(2, "hot day"),
        LineRecord::new(3, "red day"),
        LineRecord::new(4, "hot sun"),
        LineRecord::new(5, "cold moon"),
        LineRecord::new(6, "dark night"),
        LineRecord::new(7, "cold night"),
        LineRecord::new(8, "dark moon"),
        LineRecord::new(9, "sweet rain"),
        LineRecord::new(10, "soft wind"),
        LineRecord::new(11, "sweet wind"),
        LineRecord::new(12, "soft rain"),
        LineRecord::new(20, "Red moon."),
        LineRecord::new(21, "hot night"),
        LineRecord::new(22, "cold sun"),
        LineRecord::new(23, "dark day"),
        LineRecord::new(24, "sweet, soft"),
        LineRecord::new(25, "rain wind"),
        LineRecord::new(26, "red hot"),
        LineRecord::new(27, "sun day"),
        // duplicate of line 1
        LineRecord::new(30, "Sun, red!"),
        // "heron" appears in only two lines
        LineRecord::new(40, "lonely heron"),
        LineRecord::new(41, "red heron"),
        // too short
        LineRecord::new(42, "sun"),
    ]
}

fn sample_config() -> SearchConfig {
    SearchConfig::default().with_min_tokens(2)
}

fn union(ctx: &SearchContext, ids: &[LineId]) -> WordBag {
    WordBag::union_all(ids.iter().map(|&id| ctx.bag(id).unwrap()))
}

fn expected_poem() -> Poem {
    Poem::new(
        [
            Stanza::new((1, 2), (3, 4)),
            Stanza::new((5, 6), (7, 8)),
            Stanza::new((9, 10), (11, 12)),
        ],
        vec![20, 21, 22, 23, 24, 25],
    )
}

#[test]
fn test_full_search() {
    let runner = Paradeller::new(sample_config()).unwrap();
    let results = runner.run(&sample_records(), None).unwrap();

    assert!(results.stanzas.contains(&Stanza::new((1, 2), (3, 4))));
    assert!(results.stanzas.contains(&Stanza::new((1, 2), (26, 27))));
    assert!(results.stanzas.contains(&Stanza::new((5, 6), (7, 8))));
    assert!(results.poems.contains(&expected_poem()));

    assert_eq!(results.duplicates.get(&1), Some(&vec![30]));
    assert_eq!(results.duplicates.len(), 1);

    let meta = &results.meta;
    assert_eq!(meta.input_lines, 24);
    assert_eq!(meta.reduced_lines, 20);
    assert_eq!(meta.seeds_used, 20);
    assert_eq!(meta.seed_shortfall, 80);
    assert_eq!(meta.seed_pairs_searched, 20 * 19 / 2);
    assert_eq!(meta.data_source, DataSource::Fresh);
    assert!(!meta.incomplete);
    assert!(meta.finished_at_ms >= meta.started_at_ms);
}

#[test]
fn test_results_are_exact_and_disjoint() {
    let runner = Paradeller::new(sample_config()).unwrap();
    let records = sample_records();
    let ctx = runner.prepare(&records).unwrap().to_context().unwrap();
    let results = runner.run(&records, None).unwrap();

    assert!(!results.stanzas.is_empty());
    for stanza in &results.stanzas {
        assert!(stanza.is_disjoint(), "{stanza:?} reuses a line");
        assert_eq!(
            union(&ctx, &stanza.seeds),
            union(&ctx, &stanza.completions),
            "{stanza:?} is not balanced"
        );
    }

    assert!(!results.poems.is_empty());
    for poem in &results.poems {
        assert!(poem.is_disjoint(), "{poem:?} reuses a line");
        assert_eq!(poem.final_lines.len(), 6);
        let completions: Vec<LineId> = poem.stanzas.iter().flat_map(|s| s.completions).collect();
        assert_eq!(union(&ctx, &completions), union(&ctx, &poem.final_lines));
    }
}

#[test]
fn test_results_canonical_and_sorted() {
    let runner = Paradeller::new(sample_config()).unwrap();
    let results = runner.run(&sample_records(), None).unwrap();

    for stanza in &results.stanzas {
        assert_eq!(*stanza, stanza.canonical());
    }
    for poem in &results.poems {
        assert_eq!(*poem, poem.canonical());
    }
    assert!(results.stanzas.windows(2).all(|w| w[0] < w[1]));
    assert!(results.poems.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_duplicates_example() {
    let records = vec![
        LineRecord::new(1, "the cat sat"),
        LineRecord::new(2, "the cat sat"),
        LineRecord::new(3, "a dog ran"),
        LineRecord::new(4, "a dog ran"),
    ];
    let store = LineStore::from_records(&records, &Tokenizer::new()).unwrap();
    let reducer = CorpusReducer::new(2);
    let mut groups = reduce::DuplicateGroups::new();
    let (_, report) = reducer.run_pass(&store, &mut groups, 1);

    assert_eq!(report.short, 0);
    assert_eq!(report.duplicates, 2);
    let first_seen = store.retain(|l| l.id == 1 || l.id == 3);
    let duplicates = groups.report(&first_seen);
    assert_eq!(duplicates.get(&1), Some(&vec![2]));
    assert_eq!(duplicates.get(&3), Some(&vec![4]));
}

#[test]
fn test_regrouped_completions_example() {
    let store = LineStore::from_tokenized(vec![
        (1, vec!["a", "a", "b"]),
        (2, vec!["c"]),
        (3, vec!["a", "c"]),
        (4, vec!["a", "b"]),
        (5, vec!["a", "a"]),
        (6, vec!["b", "c"]),
    ])
    .unwrap();
    let ctx = SearchContext::new(store);
    let pairs = find_stanza_completions(&ctx, 1, 2).unwrap();
    assert_eq!(pairs, vec![(3, 4), (5, 6)]);
}

#[test]
fn test_seed_budget_pair_counts() {
    let store = LineStore::from_tokenized(vec![
        (1, vec!["a", "b"]),
        (2, vec!["c", "d"]),
        (3, vec!["a", "c"]),
        (4, vec!["b", "d"]),
        (5, vec!["a", "d"]),
    ])
    .unwrap();
    let ctx = SearchContext::new(store);

    for (budget, pairs) in [(2, 1), (5, 10)] {
        let config = SearchConfig::default().with_seed_budget(budget);
        let outcome = SearchOrchestrator::new(&ctx, &config).run().unwrap();
        assert_eq!(outcome.seed_pairs_searched, pairs);
    }
}

#[test]
fn test_two_stanzas_skip_poem_search() {
    let records = vec![
        LineRecord::new(1, "a b"),
        LineRecord::new(2, "c d"),
        LineRecord::new(3, "a c"),
        LineRecord::new(4, "b d"),
        LineRecord::new(5, "a d"),
        LineRecord::new(6, "b c"),
    ];
    let config = SearchConfig::default().with_min_tokens(2).with_seed_budget(2);
    let results = Paradeller::new(config).unwrap().run(&records, None).unwrap();

    assert_eq!(results.stanzas.len(), 2);
    assert!(results.poems.is_empty());
    assert_eq!(results.meta.stanza_groups_searched, 0);
}

#[test]
fn test_cached_run_matches_fresh() {
    let records = sample_records();
    let fresh = Paradeller::new(sample_config()).unwrap();
    let prepared = fresh.prepare(&records).unwrap();
    let fresh_results = fresh.run(&records, None).unwrap();

    // The cache survives a trip through JSON.
    let prepared = PreparedCorpus::from_json(&prepared.to_json().unwrap()).unwrap();

    let cached = Paradeller::new(sample_config().with_data_source(DataSource::Cached)).unwrap();
    let cached_results = cached.run(&[], Some(&prepared)).unwrap();

    assert_eq!(cached_results.stanzas, fresh_results.stanzas);
    assert_eq!(cached_results.poems, fresh_results.poems);
    assert_eq!(cached_results.duplicates, fresh_results.duplicates);
    assert_eq!(cached_results.meta.data_source, DataSource::Cached);
    assert_eq!(cached_results.meta.input_lines, 24);
}

#[test]
fn test_single_thread_matches_parallel() {
    let records = sample_records();
    let parallel = Paradeller::new(sample_config().with_max_threads(4))
        .unwrap()
        .run(&records, None)
        .unwrap();
    let single = Paradeller::new(sample_config().with_single_thread(true))
        .unwrap()
        .run(&records, None)
        .unwrap();

    assert_eq!(parallel.stanzas, single.stanzas);
    assert_eq!(parallel.poems, single.poems);
}

#[test]
fn test_cancellation() {
    let runner = Paradeller::new(sample_config()).unwrap();
    let token = runner.cancel_token();
    token.cancel();
    assert!(runner.run(&sample_records(), None).unwrap_err().is_cancelled());
}

#[test]
fn test_skip_and_log_marks_incomplete() {
    let config = sample_config()
        .with_max_candidates(2)
        .with_failure_policy(FailurePolicy::SkipAndLog);
    let results = Paradeller::new(config)
        .unwrap()
        .run(&sample_records(), None)
        .unwrap();

    assert!(results.meta.incomplete);
    assert!(results.meta.failed_units > 0);
}

#[test]
fn test_fail_fast_aborts_batch() {
    let config = sample_config().with_max_candidates(2);
    let err = Paradeller::new(config)
        .unwrap()
        .run(&sample_records(), None)
        .unwrap_err();
    assert!(matches!(err, ParadelleError::WorkerFailed { .. }));
}

#[test]
fn test_results_json_round_trip() {
    let runner = Paradeller::new(sample_config()).unwrap();
    let results = runner.run(&sample_records(), None).unwrap();
    let json = results.to_json_pretty().unwrap();
    assert_eq!(SearchResults::from_json(&json).unwrap(), results);
}

#[test]
fn test_config_from_json() {
    let config: SearchConfig = serde_json::from_str(
        r#"{ "seed_budget": 10, "min_tokens": 2, "oddball_policy": "strict" }"#,
    )
    .unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.oddball_policy, OddballPolicy::Strict);
    assert_eq!(config.final_stanza_lines, 6);
}

#[test]
fn test_duplicate_record_id_rejected() {
    let records = vec![
        LineRecord::new(7, "a b c"),
        LineRecord::new(7, "d e f"),
    ];
    let err = Paradeller::new(SearchConfig::default())
        .unwrap()
        .run(&records, None)
        .unwrap_err();
    assert_eq!(err, ParadelleError::invalid_record(1, 7, "duplicate line id"));
}
