//! Normalization and timeframe parsing benchmarks.
//!
//! Run with: `cargo bench --package brokerkit-bench`

use brokerkit_bench::{TIMEFRAME_INPUTS, bar_items, snapshot_item};
use brokerkit_lib::{BarRecord, RecordShape, SnapshotRecord, TimeframeSpec, normalize_keyed, normalize_keyed_as};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn normalize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for count in [100_usize, 1_000, 10_000] {
        let items = bar_items(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("bars_typed", count), &items, |b, items| {
            b.iter(|| {
                for item in items {
                    let bar: BarRecord = normalize_keyed_as("AAPL", black_box(item)).unwrap();
                    black_box(bar);
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("bars_by_shape", count), &items, |b, items| {
            b.iter(|| {
                for item in items {
                    black_box(normalize_keyed("AAPL", black_box(item), RecordShape::Bar).unwrap());
                }
            });
        });
    }

    let snapshot = snapshot_item();
    group.throughput(Throughput::Elements(1));
    group.bench_function("snapshot", |b| {
        b.iter(|| {
            let record: SnapshotRecord = normalize_keyed_as("AAPL", black_box(&snapshot)).unwrap();
            black_box(record);
        });
    });

    group.finish();
}

fn timeframe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeframe");
    group.throughput(Throughput::Elements(TIMEFRAME_INPUTS.len() as u64));
    group.bench_function("parse", |b| {
        b.iter(|| {
            for input in TIMEFRAME_INPUTS {
                black_box(TimeframeSpec::parse(black_box(input)).unwrap());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, normalize_benchmark, timeframe_benchmark);
criterion_main!(benches);
