//! Basic benchmarks for `DynArray` in the `policy_collections` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use policy_collections::DynArray;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("dyn_array_basic");

    let allocs_op = allocs.operation("append_one");
    group.bench_function("append_one", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(DynArray::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                array.append(black_box(&TEST_VALUE)).unwrap();
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one");
    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut array = DynArray::<TestItem>::new();
            array.append(&TEST_VALUE).unwrap();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(array[black_box(0)]);
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("pop_one");
    group.bench_function("pop_one", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| {
                let mut array = DynArray::<TestItem>::new();
                array.append(&TEST_VALUE).unwrap();
                array
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                _ = black_box(array.pop_back().unwrap());
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("dyn_array_slow");

    let allocs_op = allocs.operation("append_10k");
    group.bench_function("append_10k", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(DynArray::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..10_000 {
                    array.append(black_box(&TEST_VALUE)).unwrap();
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("append_10k_preallocated");
    group.bench_function("append_10k_preallocated", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| DynArray::<TestItem>::with_capacity(10_000))
                .take(usize::try_from(iters).unwrap())
                .collect::<Result<Vec<_>, _>>()
                .unwrap();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..10_000 {
                    array.append(black_box(&TEST_VALUE)).unwrap();
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("pop_10k");
    group.bench_function("pop_10k", |b| {
        // Popping down from 10k elements repeatedly crosses the shrink threshold.
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| {
                let mut array = DynArray::<TestItem>::new();
                array.resize(10_000).unwrap();
                array
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                while let Some(value) = array.pop_back().unwrap() {
                    _ = black_box(value);
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_front_1k");
    group.bench_function("insert_front_1k", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| {
                let mut array = DynArray::<TestItem>::new();
                array.resize(1_000).unwrap();
                array
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..1_000 {
                    array.insert(0, [black_box(TEST_VALUE)]).unwrap();
                }
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
