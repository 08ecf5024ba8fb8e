use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use totient_bench::{Nesting, Schedule, Sequential, ThreadPoolExecutor, TotientRange};

fn bench_sum_totients(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_totients");
    let upper = 3_000;

    group.bench_function(BenchmarkId::new("sequential", upper), |b| {
        let range = TotientRange::new(Sequential, Schedule::default(), Nesting::Flattened);
        b.iter(|| range.sum(black_box(1), black_box(upper)))
    });

    let pool = ThreadPoolExecutor::new(None).expect("worker pool");
    for nesting in [Nesting::Shared, Nesting::Flattened] {
        let range = TotientRange::new(&pool, Schedule::default(), nesting);
        group.bench_function(BenchmarkId::new(format!("{nesting:?}"), upper), |b| {
            b.iter(|| range.sum(black_box(1), black_box(upper)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sum_totients);
criterion_main!(benches);
