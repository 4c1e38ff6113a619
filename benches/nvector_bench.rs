//! Thread-count scaling of the vector kernels.
//!
//! Run with: cargo bench --bench nvector_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nvector_parallel::{dot_prod, linear_sum, wrms_norm, NVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use std::time::Duration;

const THREADS: [usize; 4] = [1, 2, 4, 8];

fn random_vector(len: usize, nthreads: usize, seed: u64) -> NVector<'static> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v = NVector::new(len, nthreads).unwrap();
    v.as_mut_slice()
        .unwrap()
        .iter_mut()
        .for_each(|x| *x = rng.gen_range(-1.0..1.0));
    v
}

fn bench_linear_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_sum");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for len in [1_000usize, 100_000, 1_000_000] {
        group.throughput(Throughput::Elements(len as u64));
        for nthreads in THREADS {
            let x = random_vector(len, nthreads, 1);
            let y = random_vector(len, nthreads, 2);
            let mut z = NVector::new(len, nthreads).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("threads={nthreads}"), len),
                &len,
                |bench, _| {
                    bench.iter(|| linear_sum(black_box(2.0), &x, -1.0, &y, &mut z).unwrap())
                },
            );
        }
    }
    group.finish();
}

fn bench_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("reductions");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let len = 1_000_000usize;
    group.throughput(Throughput::Elements(len as u64));
    for nthreads in THREADS {
        let x = random_vector(len, nthreads, 3);
        let w = random_vector(len, nthreads, 4);
        group.bench_with_input(BenchmarkId::new("dot_prod", nthreads), &nthreads, |bench, _| {
            bench.iter(|| black_box(dot_prod(&x, &w).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("wrms_norm", nthreads), &nthreads, |bench, _| {
            bench.iter(|| black_box(wrms_norm(&x, &w).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_linear_sum, bench_reductions);
criterion_main!(benches);
