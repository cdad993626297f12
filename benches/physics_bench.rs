use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use impulse2d::{Body, BodyKind, Shape, Space};
use std::hint::black_box;

const DT: f32 = 1.0 / 60.0;

fn build_pyramid(rows: usize) -> Space {
    let mut space = Space::new(Vec2::new(0.0, -10.0));

    let mut ground = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    ground.add_shape(Shape::segment(
        Vec2::new(-100.0, 0.0),
        Vec2::new(100.0, 0.0),
        0.0,
    ));
    space.add_body(ground);

    for row in 0..rows {
        let count = rows - row;
        let x0 = -(count as f32 - 1.0) * 0.55;
        for i in 0..count {
            let mut body = Body::new(
                BodyKind::Dynamic,
                Vec2::new(x0 + i as f32 * 1.1, 0.5 + row as f32 * 1.0),
                0.0,
            );
            body.add_shape(Shape::new_box(0.0, 0.0, 1.0, 1.0));
            space.add_body(body);
        }
    }
    space
}

fn bench_pyramid_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid_step");
    for &rows in &[5usize, 10, 20] {
        group.bench_with_input(BenchmarkId::new("step", rows), &rows, |b, &rows| {
            let mut space = build_pyramid(rows);
            // Let the stack settle so the bench measures steady-state solving.
            for _ in 0..30 {
                space.step(DT, 8, 3, true);
            }
            b.iter(|| {
                space.step(black_box(DT), 8, 3, true);
            })
        });
    }
    group.finish();
}

fn bench_broad_phase_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_field");
    for &count in &[256usize, 1024] {
        group.bench_with_input(BenchmarkId::new("step", count), &count, |b, &count| {
            let mut space = Space::new(Vec2::ZERO);
            let side = (count as f32).sqrt().ceil() as usize;
            for i in 0..count {
                let x = (i % side) as f32 * 5.0;
                let y = (i / side) as f32 * 5.0;
                let mut body = Body::new(BodyKind::Dynamic, Vec2::new(x, y), 0.0);
                body.add_shape(Shape::circle(0.0, 0.0, 0.5));
                space.add_body(body);
            }
            b.iter(|| {
                space.step(black_box(DT), 8, 3, true);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pyramid_step, bench_broad_phase_sparse);
criterion_main!(benches);
