//! Benchmarks for boolean clipping and offsetting.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use scanbeam::{
    inflate_paths, paths_intersection, paths_union, EndType, FillRule, JoinType, Path64, Paths64,
    Point64,
};

/// A spiky star polygon with `points * 2` vertices, deterministic.
fn star(points: usize, cx: i64, cy: i64) -> Path64 {
    let mut path = Path64::with_capacity(points * 2);
    for i in 0..points * 2 {
        let angle = std::f64::consts::PI * i as f64 / points as f64;
        let radius = if i % 2 == 0 { 1000.0 } else { 400.0 };
        path.push(Point64::new(
            cx + (radius * angle.cos()) as i64,
            cy + (radius * angle.sin()) as i64,
        ));
    }
    path
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");

    for points in [10, 100, 1000] {
        let subject: Paths64 = vec![star(points, 0, 0)];
        let clip: Paths64 = vec![star(points, 300, 300)];
        group.throughput(Throughput::Elements(points as u64 * 2));

        group.bench_with_input(
            BenchmarkId::new("intersection", points),
            &points,
            |b, _| {
                b.iter(|| {
                    paths_intersection(black_box(&subject), black_box(&clip), FillRule::NonZero)
                        .unwrap()
                })
            },
        );

        group.bench_with_input(BenchmarkId::new("union", points), &points, |b, _| {
            b.iter(|| {
                paths_union(black_box(&subject), black_box(&clip), FillRule::NonZero).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset");

    for points in [10, 100, 1000] {
        let paths: Paths64 = vec![star(points, 0, 0)];
        group.throughput(Throughput::Elements(points as u64 * 2));

        group.bench_with_input(BenchmarkId::new("miter", points), &points, |b, _| {
            b.iter(|| {
                inflate_paths(black_box(&paths), 20.0, JoinType::Miter, EndType::Polygon).unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("round", points), &points, |b, _| {
            b.iter(|| {
                inflate_paths(black_box(&paths), 20.0, JoinType::Round, EndType::Polygon).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_boolean_ops, bench_offset);
criterion_main!(benches);
