//! Benchmarks the hot-path drive control arithmetic.
//!
//! Everything here runs inside the 20 ms control cycle, so keep an eye on regressions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bot_lib::drive_ctrl::{apply_deadband, mix, SlewLimiter};

// ---------------------------------------------------------------------------
// BENCHMARKS
// ---------------------------------------------------------------------------

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("mix", |b| {
        b.iter(|| mix(black_box(0.62), black_box(-0.31), true))
    });

    c.bench_function("apply_deadband", |b| {
        b.iter(|| apply_deadband(black_box(0.47), black_box(0.05)))
    });

    let mut limiter = SlewLimiter::new(2.5, 4.5, 0.0, 0.0).unwrap();
    let mut time_s = 0.0;

    c.bench_function("slew_limiter_calculate", |b| {
        b.iter(|| {
            time_s += 0.02;
            limiter.calculate(black_box(0.8), time_s)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
