//! Benchmarks for the per-frame scene update.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use raindrops::fall::FallConfig;
use raindrops::geometry::{lathe, raindrop_profile};
use raindrops::spawn::{SpawnConfig, Spawner};

fn arena(count: u32) -> raindrops::InstanceArena {
    Spawner::new(SpawnConfig {
        count,
        seed: Some(7),
        ..SpawnConfig::default()
    })
    .spawn()
}

fn bench_animate(c: &mut Criterion) {
    let mut group = c.benchmark_group("animate");
    let cfg = FallConfig::default();

    for count in [150u32, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut drops = arena(count);
            b.iter(|| black_box(drops.animate(&cfg)))
        });
    }

    group.finish();
}

fn bench_depth_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_back_to_front");
    let eye = Vec3::new(0.0, 0.0, 5.0);

    for count in [150u32, 10_000] {
        let drops = arena(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &drops, |b, drops| {
            b.iter(|| black_box(drops.sorted_back_to_front(eye)))
        });
    }

    group.finish();
}

fn bench_lathe(c: &mut Criterion) {
    let profile = raindrop_profile();
    c.bench_function("lathe_32", |b| b.iter(|| black_box(lathe(&profile, 32))));
}

criterion_group!(benches, bench_animate, bench_depth_sort, bench_lathe);
criterion_main!(benches);
