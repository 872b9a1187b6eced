//! Slot store benchmarks: insertion bursts and register/unregister churn.
//!
//! The store trades amortized-doubling throughput for fixed-increment
//! reallocation steps; these benchmarks keep an eye on what that costs at
//! realistic component counts.
//!
//! Run with: `cargo bench --bench store_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use melos_registry::prelude::*;

fn bench_insert_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_burst");
    for count in [8usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut store: SlotStore<u64> = SlotStore::new();
                for i in 0..count {
                    store.insert(black_box(i as u64)).unwrap();
                }
                black_box(store.len())
            });
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("swap_remove_churn", |b| {
        b.iter(|| {
            let mut store: SlotStore<u64> = SlotStore::new();
            for i in 0..64u64 {
                store.insert(i).unwrap();
            }
            // Remove from the front (worst case: every removal swaps) while
            // topping back up, crossing shrink thresholds repeatedly.
            for round in 0..8u64 {
                for _ in 0..32 {
                    store.swap_remove(0).unwrap();
                }
                for i in 0..32u64 {
                    store.insert(round * 100 + i).unwrap();
                }
            }
            black_box(store.capacity())
        });
    });
}

criterion_group!(benches, bench_insert_burst, bench_churn);
criterion_main!(benches);
