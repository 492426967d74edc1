//! Criterion benchmarks for L0 smoothing core operations.
//!
//! Run with: cargo bench -p l0_core
//! Run specific: cargo bench -p l0_core -- fft2d

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::{Array2, Array3};
use rand::prelude::*;

use l0_core::psf::{horizontal_kernel, psf2otf_with_plans};
use l0_core::smoothing::half_quadratic_step;
use l0_core::{fft2d, ifft2d, l0_smooth, L0Config, SpectralPlans, SpectralSetup};

// =============================================================================
// Helper Functions for Test Data Generation
// =============================================================================

fn random_matrix_f64(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| rng.gen())
}

fn random_signal<F>(rows: usize, cols: usize, channels: usize, seed: u64) -> Array3<F>
where
    rand::distributions::Standard: Distribution<F>,
{
    let mut rng = StdRng::seed_from_u64(seed);
    Array3::from_shape_fn((rows, cols, channels), |_| rng.gen())
}

// =============================================================================
// FFT Benchmarks
// =============================================================================

fn bench_fft2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft2d");

    for size in [16, 64, 128, 256] {
        let input = random_matrix_f64(size, size, 42);
        let plans = SpectralPlans::new(size, size);

        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("forward", size), &size, |b, _| {
            b.iter(|| fft2d(black_box(input.view()), &plans))
        });

        let freq = fft2d(input.view(), &plans);
        group.bench_with_input(BenchmarkId::new("inverse", size), &size, |b, _| {
            b.iter(|| ifft2d(black_box(freq.view()), &plans))
        });

        group.bench_with_input(BenchmarkId::new("roundtrip", size), &size, |b, _| {
            b.iter(|| {
                let f = fft2d(black_box(input.view()), &plans);
                ifft2d(f.view(), &plans)
            })
        });
    }

    group.finish();
}

fn bench_psf2otf(c: &mut Criterion) {
    let mut group = c.benchmark_group("psf2otf");
    let kernel = horizontal_kernel::<f64>();

    for size in [64, 256] {
        let plans = SpectralPlans::new(size, size);
        group.bench_with_input(BenchmarkId::new("horizontal", size), &size, |b, _| {
            b.iter(|| psf2otf_with_plans(black_box(kernel.view()), &plans))
        });
    }

    group.finish();
}

// =============================================================================
// Solver Benchmarks
// =============================================================================

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("half_quadratic_step");
    group.sample_size(20);

    for size in [64, 128] {
        let signal = random_signal::<f64>(size, size, 3, 7);
        let setup = SpectralSetup::new(signal.view()).expect("spectral setup failed");

        group.throughput(Throughput::Elements((size * size * 3) as u64));
        group.bench_with_input(BenchmarkId::new("rgb", size), &size, |b, _| {
            b.iter(|| {
                let mut work = signal.clone();
                half_quadratic_step(&mut work, &setup, 2e-2, 0.04)
            })
        });
    }

    group.finish();
}

fn bench_l0_smooth(c: &mut Criterion) {
    let mut group = c.benchmark_group("l0_smooth");
    group.sample_size(10);

    let config = L0Config::<f64>::default();
    for (size, channels) in [(64, 1), (64, 3), (128, 3)] {
        let signal = random_signal::<f64>(size, size, channels, 11);
        let id = format!("{}x{}x{}", size, size, channels);

        group.throughput(Throughput::Elements((size * size * channels) as u64));
        group.bench_function(BenchmarkId::new("default", id), |b| {
            b.iter(|| l0_smooth(black_box(signal.view()), &config))
        });
    }

    group.finish();
}

// =============================================================================
// Precision Comparison
// =============================================================================

fn bench_precision_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("precision");
    group.sample_size(10);

    let size = 96;
    let signal_f32 = random_signal::<f32>(size, size, 3, 5);
    let signal_f64 = random_signal::<f64>(size, size, 3, 5);
    let config_f32 = L0Config::<f32>::default();
    let config_f64 = L0Config::<f64>::default();

    group.bench_function("l0_smooth_f32", |b| {
        b.iter(|| l0_smooth(black_box(signal_f32.view()), &config_f32))
    });
    group.bench_function("l0_smooth_f64", |b| {
        b.iter(|| l0_smooth(black_box(signal_f64.view()), &config_f64))
    });

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_fft2d,
    bench_psf2otf,
    bench_single_step,
    bench_l0_smooth,
    bench_precision_comparison,
);

criterion_main!(benches);
