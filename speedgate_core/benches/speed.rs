use criterion::{black_box, criterion_group, criterion_main, Criterion};
use speedgate_core::fixed_point::q53_distance_fixed;
use speedgate_core::{speed_scaled, TickCounter};

fn bench_speed_formula(c: &mut Criterion) {
    c.bench_function("speed_scaled", |b| {
        b.iter(|| speed_scaled(black_box(166_250), black_box(10_000)))
    });

    c.bench_function("q53_decode", |b| {
        b.iter(|| q53_distance_fixed(black_box(0x85)))
    });
}

fn bench_tick_hot_path(c: &mut Criterion) {
    let counter = TickCounter::new();
    counter.arm();
    c.bench_function("on_tick", |b| b.iter(|| counter.on_tick()));
}

criterion_group!(benches, bench_speed_formula, bench_tick_hot_path);
criterion_main!(benches);
