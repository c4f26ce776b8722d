//! Query benchmarks for SXI
//!
//! Run with: cargo bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sxi::index::{ShardedIndex, SuffixArray, build_worker_pool};
use sxi::query::{BaselineIndex, StringQuery};
use sxi::utils::records::{Record, absent_probes, generate_records, present_probes};

const RECORDS: usize = 100_000;

fn borrowed(records: &[Record]) -> impl Iterator<Item = (u64, impl Iterator<Item = &str> + Send)> {
    records.iter().map(|(id, strings)| (*id, strings.iter().map(String::as_str)))
}

fn bench_contains(c: &mut Criterion) {
    let records = generate_records(RECORDS, 0);
    let index = SuffixArray::build(borrowed(&records)).expect("Failed to build index");
    let probes = present_probes(&records, 1_000, 1);
    let absent = absent_probes(&records, 1_000);

    let mut group = c.benchmark_group("contains");

    group.bench_function("present", |b| {
        b.iter(|| {
            probes
                .iter()
                .map(|p| index.contains(black_box(p)).count())
                .sum::<usize>()
        })
    });

    group.bench_function("absent", |b| {
        b.iter(|| {
            absent
                .iter()
                .map(|p| index.contains(black_box(p)).count())
                .sum::<usize>()
        })
    });

    group.bench_function("single_letter", |b| b.iter(|| index.contains(black_box("A")).count()));

    group.finish();
}

fn bench_ends_with(c: &mut Criterion) {
    let records = generate_records(RECORDS, 0);
    let index = SuffixArray::build(borrowed(&records)).expect("Failed to build index");
    let suffixes: Vec<String> = records
        .iter()
        .take(1_000)
        .map(|(_, strings)| strings[0].chars().skip(14).collect())
        .collect();

    c.bench_function("ends_with", |b| {
        b.iter(|| {
            suffixes
                .iter()
                .map(|s| index.ends_with(black_box(s)).count())
                .sum::<usize>()
        })
    });
}

fn bench_sharded_contains(c: &mut Criterion) {
    let records = generate_records(RECORDS, 0);
    let pool = build_worker_pool(0).expect("Failed to create worker pool");
    let index = ShardedIndex::build(borrowed(&records), 4, &pool).expect("Failed to build index");
    let probes = present_probes(&records, 1_000, 1);

    c.bench_function("sharded_contains", |b| {
        b.iter(|| {
            probes
                .iter()
                .map(|p| index.contains(black_box(p)).count())
                .sum::<usize>()
        })
    });
}

fn bench_baseline(c: &mut Criterion) {
    let records = generate_records(10_000, 0);
    let baseline = BaselineIndex::new(records.iter().cloned());
    let query = StringQuery::contains("ABCD");

    c.bench_function("baseline_scan", |b| b.iter(|| baseline.matching(black_box(&query)).count()));
}

criterion_group!(
    benches,
    bench_contains,
    bench_ends_with,
    bench_sharded_contains,
    bench_baseline,
);

criterion_main!(benches);
