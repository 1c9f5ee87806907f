//! Single-threaded throughput benchmarks for `insert` and `delete_min`.
//!
//! Concurrent throughput is measured by `skipq-bench`; these benchmarks
//! isolate the per-call cost of the two hot-path operations in the absence
//! of contention.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skipq_skiplist::{PriorityQueue, SkipListConfig};

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let pq = PriorityQueue::new(SkipListConfig::default());
                for k in 0..size {
                    pq.insert(black_box(k as u64), k as u64);
                }
            });
        });
    }

    group.finish();
}

fn bench_delete_min(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_min");

    for size in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || {
                    let pq = PriorityQueue::new(SkipListConfig::default());
                    for k in 0..size {
                        pq.insert(k as u64, k as u64);
                    }
                    pq
                },
                |pq| {
                    for _ in 0..size {
                        black_box(pq.delete_min());
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_mixed_single_thread(c: &mut Criterion) {
    c.bench_function("mixed_insert_delete_min", |b| {
        let pq = PriorityQueue::new(SkipListConfig::default());
        for k in 0..1_000u64 {
            pq.insert(k, k);
        }

        b.iter(|| {
            for k in 0..100u64 {
                pq.insert(black_box(k), k);
                black_box(pq.delete_min());
            }
        });
    });
}

criterion_group!(benches, bench_insert, bench_delete_min, bench_mixed_single_thread);
criterion_main!(benches);
