//! Benchmarks for rapid_paradelle

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rapid_paradelle::*;

const VOCABULARY: &[&str] = &[
    "the", "cold", "wind", "moon", "dark", "night", "red", "sun", "day", "sweet", "rain", "soft",
    "river", "stone", "bird", "song", "light", "falls", "over", "under", "my", "your", "heart",
    "sleeps",
];

/// Deterministic pseudo-random lines of three to five words
fn synthetic_records(count: usize) -> Vec<LineRecord> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) as usize
    };

    (0..count)
        .map(|i| {
            let len = 3 + next() % 3;
            let text = (0..len)
                .map(|_| VOCABULARY[next() % VOCABULARY.len()])
                .collect::<Vec<_>>()
                .join(" ");
            LineRecord::new(i as LineId, text)
        })
        .collect()
}

fn benchmark_tokenization(c: &mut Criterion) {
    let tokenizer = Tokenizer::new();
    let line = "“Sweet rain,” she said, falling over the cold, dark river!";

    c.bench_function("tokenize_line", |b| {
        b.iter(|| tokenizer.tokenize(black_box(line)))
    });
}

fn benchmark_reduction(c: &mut Criterion) {
    let tokenizer = Tokenizer::new();

    let mut group = c.benchmark_group("reduce_by_size");
    for size in [1_000, 5_000, 20_000].iter() {
        let records = synthetic_records(*size);
        let store = LineStore::from_records(&records, &tokenizer).unwrap();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| CorpusReducer::new(3).reduce(black_box(store.clone())))
        });
    }
    group.finish();
}

fn benchmark_index_build(c: &mut Criterion) {
    let records = synthetic_records(20_000);
    let store = LineStore::from_records(&records, &Tokenizer::new()).unwrap();

    c.bench_function("index_build_20k", |b| {
        b.iter(|| InvertedIndex::build(black_box(&store)))
    });
}

fn benchmark_stanza_search(c: &mut Criterion) {
    let records = synthetic_records(5_000);
    let store = LineStore::from_records(&records, &Tokenizer::new()).unwrap();
    let ctx = SearchContext::from(CorpusReducer::new(3).reduce(store));
    let seeds = search::select_seeds(&search::rank_seeds(&ctx), 2);
    let (a, b) = seeds.pairs()[0];

    c.bench_function("stanza_completions", |bench| {
        bench.iter(|| find_stanza_completions(black_box(&ctx), a, b).unwrap())
    });

    let mut group = c.benchmark_group("orchestrated_stanza_search");
    group.sample_size(10);
    for budget in [10, 25].iter() {
        let config = SearchConfig::default().with_seed_budget(*budget);
        let pairs = search::select_seeds(&search::rank_seeds(&ctx), *budget).pairs();
        group.bench_with_input(BenchmarkId::from_parameter(budget), &pairs, |bench, pairs| {
            bench.iter(|| {
                SearchOrchestrator::new(&ctx, &config)
                    .search_stanzas(black_box(pairs))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_tokenization,
    benchmark_reduction,
    benchmark_index_build,
    benchmark_stanza_search,
);

criterion_main!(benches);
