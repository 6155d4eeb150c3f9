//! Benchmarks for field construction and the per-frame step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use silkfield::{AvoidanceRegion, FieldConfig, FrameInputs, ParticleField, Progress, Vec2, Vec3};

/// Dark disc on a transparent canvas; about 0.8 * size² qualifying pixels.
fn disc(size: u32) -> RgbaImage {
    let c = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        if dx * dx + dy * dy < c * c {
            Rgba([20, 20, 20, 255])
        } else {
            Rgba([255, 255, 255, 0])
        }
    })
}

fn bench_from_images(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_images");
    group.sample_size(20);

    let config = FieldConfig::default().with_seed(1);
    for size in [64u32, 128] {
        let images = [disc(size), disc(size - 8)];
        group.bench_with_input(BenchmarkId::from_parameter(size), &images, |b, images| {
            b.iter(|| black_box(ParticleField::from_images(images, &config)))
        });
    }

    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    let config = FieldConfig::default().with_seed(1);
    let images = [disc(128), disc(120)];

    group.bench_function("formed", |b| {
        let mut field = ParticleField::from_images(&images, &config);
        let inputs = FrameInputs::new(Progress::formed(), 1.0, 1.0 / 60.0);
        b.iter(|| field.step(black_box(&inputs)))
    });

    group.bench_function("morph_pointer_avoidance", |b| {
        let mut field = ParticleField::from_images(&images, &config);
        let inputs = FrameInputs::new(Progress::new(1.0, 0.5, 0.0), 1.0, 1.0 / 60.0)
            .with_pointer(Some(Vec3::new(10.0, 5.0, 0.0)))
            .with_avoidance(Some(AvoidanceRegion::new(Vec3::new(0.0, -60.0, 0.0), Vec2::new(40.0, 10.0))));
        b.iter(|| field.step(black_box(&inputs)))
    });

    group.bench_function("burst", |b| {
        let mut field = ParticleField::from_images(&images, &config);
        let inputs = FrameInputs::new(Progress::new(1.0, 1.0, 0.6), 1.0, 1.0 / 60.0);
        b.iter(|| field.step(black_box(&inputs)))
    });

    group.finish();
}

criterion_group!(benches, bench_from_images, bench_step);
criterion_main!(benches);
