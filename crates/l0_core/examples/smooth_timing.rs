use l0_core::{l0_smooth_with_progress, L0Config};
use ndarray::Array3;
use std::time::Instant;

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse::<T>().ok())
        .unwrap_or(default)
}

/// Blocky test card with a little LCG noise on top.
fn build_image(rows: usize, cols: usize, channels: usize, block: usize) -> Array3<f32> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    Array3::from_shape_fn((rows, cols, channels), |(i, j, c)| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let noise = ((state >> 40) as f32) / ((1u64 << 24) as f32) - 0.5;
        let tile = ((i / block + j / block + c) % 4) as f32 / 3.0;
        (tile + 0.1 * noise).clamp(0.0, 1.0)
    })
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let rows = parse_arg(&args, "--rows", 1080usize);
    let cols = parse_arg(&args, "--cols", 1920usize);
    let channels = parse_arg(&args, "--channels", 3usize);
    let block = parse_arg(&args, "--block", 64usize);
    let lambda = parse_arg(&args, "--lambda", 2e-2f32);
    let kappa = parse_arg(&args, "--kappa", 2.0f32);

    println!(
        "smooth timing start rows={} cols={} channels={} lambda={} kappa={} threads={}",
        rows,
        cols,
        channels,
        lambda,
        kappa,
        rayon::current_num_threads()
    );

    let image = build_image(rows, cols, channels, block.max(1));
    let config = L0Config::<f32>::new().with_lambda(lambda).with_kappa(kappa);

    let t0 = Instant::now();
    let mut per_iteration = Vec::new();
    let mut last = Instant::now();
    let out = l0_smooth_with_progress(image.view(), &config, None, |_, _| {
        per_iteration.push(last.elapsed().as_secs_f64());
        last = Instant::now();
    })
    .expect("l0_smooth failed");
    let elapsed = t0.elapsed();

    let checksum: f64 = out
        .iter()
        .step_by((rows * cols * channels / 4096).max(1))
        .map(|&v| v as f64)
        .sum();
    let slowest = per_iteration.iter().cloned().fold(0.0f64, f64::max);

    println!(
        "smooth timing done elapsed_s={:.3} iterations={} slowest_iter_s={:.3} checksum={:.9}",
        elapsed.as_secs_f64(),
        per_iteration.len(),
        slowest,
        checksum
    );
}
