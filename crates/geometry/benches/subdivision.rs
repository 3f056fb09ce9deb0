use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geometry::icosphere;
use glam::Vec3;

fn bench_subdivision(c: &mut Criterion) {
    let mut group = c.benchmark_group("icosphere");
    for level in 0..=5u32 {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| icosphere::generate(black_box(Vec3::ZERO), black_box(1.0), level));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_subdivision);
criterion_main!(benches);
