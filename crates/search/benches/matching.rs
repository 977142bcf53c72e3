//! Benchmarks for token-sort scoring and the matching engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fuzzy_lookup_search::{token_sort_ratio, Matcher, ResultLimit};

fn create_values(count: usize, seed: usize) -> Vec<String> {
    const WORDS: [&str; 8] = ["acme", "global", "holdings", "north", "trading", "foods", "group", "ltd"];
    (0..count)
        .map(|i| {
            let n = i * 7 + seed;
            format!(
                "{} {} {} {}",
                WORDS[n % WORDS.len()],
                WORDS[(n / 3) % WORDS.len()],
                WORDS[(n / 5) % WORDS.len()],
                i
            )
        })
        .collect()
}

fn bench_single_score(c: &mut Criterion) {
    c.bench_function("token_sort_ratio_single", |b| {
        b.iter(|| {
            token_sort_ratio(
                black_box("Acme Global Holdings Ltd"),
                black_box("Global Acme Holdings Limited"),
            )
        })
    });
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_values");
    group.sample_size(10);

    for size in [10, 100, 300].iter() {
        let source = create_values(*size, 1);
        let target = create_values(*size, 2);

        for workers in [1, 0] {
            let label = if workers == 1 { "sequential" } else { "parallel" };
            let matcher = Matcher::new(85, ResultLimit::PerSource(5)).workers(workers);
            group.bench_with_input(BenchmarkId::new(label, size), size, |b, _| {
                b.iter(|| matcher.run(black_box(&source), black_box(&target)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_single_score, bench_engine);
criterion_main!(benches);
