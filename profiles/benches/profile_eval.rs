//! Per-point evaluation and shooting throughput.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use profiles::{AccuracyParams, SecondKick, Spergel};

fn bench_spergel(c: &mut Criterion) {
    let params = AccuracyParams::shared_default();
    let profile = Spergel::with_scale_radius(0.5, 1.0, 1.0, &params).unwrap();

    c.bench_function("spergel_x_value", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 1..100 {
                acc += profile.x_value(black_box(i as f64 * 0.05), 0.3);
            }
            acc
        })
    });

    c.bench_function("spergel_k_value", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..100 {
                acc += profile.k_value(black_box(i as f64 * 0.1), 0.2);
            }
            acc
        })
    });

    // First call builds the sampler; keep it out of the measured loop.
    let mut rng = StdRng::seed_from_u64(1);
    profile.shoot(100, &mut rng).unwrap();
    c.bench_function("spergel_shoot_10k", |b| {
        b.iter(|| profile.shoot(black_box(10_000), &mut rng).unwrap())
    });
}

fn bench_second_kick(c: &mut Criterion) {
    let params = AccuracyParams::shared_default();
    let profile = SecondKick::new(1.0, 2.0, 1.0, &params).unwrap();

    c.bench_function("second_kick_x_value", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..100 {
                acc += profile.x_value(black_box(i as f64 * 0.1), 0.1);
            }
            acc
        })
    });

    let mut rng = StdRng::seed_from_u64(2);
    profile.shoot(100, &mut rng).unwrap();
    c.bench_function("second_kick_shoot_10k", |b| {
        b.iter(|| profile.shoot(black_box(10_000), &mut rng).unwrap())
    });
}

criterion_group!(benches, bench_spergel, bench_second_kick);
criterion_main!(benches);
