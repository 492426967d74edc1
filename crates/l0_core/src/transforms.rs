use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::float_trait::L0Float;

/// Pre-computed FFT plans for one image shape.
///
/// Planning is the expensive part of rustfft; the solver builds this once per
/// image and reuses it for the setup transform and for every iteration.
pub struct SpectralPlans<F: L0Float> {
    rows: usize,
    cols: usize,
    fft_row: Arc<dyn Fft<F>>,
    fft_col: Arc<dyn Fft<F>>,
    ifft_row: Arc<dyn Fft<F>>,
    ifft_col: Arc<dyn Fft<F>>,
}

impl<F: L0Float> SpectralPlans<F> {
    /// Plan forward and inverse transforms for `rows x cols` arrays.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            rows,
            cols,
            fft_row: planner.plan_fft_forward(cols),
            fft_col: planner.plan_fft_forward(rows),
            ifft_row: planner.plan_fft_inverse(cols),
            ifft_col: planner.plan_fft_inverse(rows),
        }
    }

    /// The (rows, cols) shape these plans were built for.
    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Apply a separable 2D transform in place: rows first, then columns.
fn transform_inplace<F: L0Float>(
    data: &mut Array2<Complex<F>>,
    row_plan: &Arc<dyn Fft<F>>,
    col_plan: &Arc<dyn Fft<F>>,
) {
    let (rows, cols) = data.dim();

    let mut row_vec = vec![Complex::new(F::zero(), F::zero()); cols];
    for mut row in data.rows_mut() {
        for (dst, src) in row_vec.iter_mut().zip(row.iter()) {
            *dst = *src;
        }
        row_plan.process(&mut row_vec);
        row.iter_mut().zip(row_vec.iter()).for_each(|(dst, src)| *dst = *src);
    }

    let mut col_vec = vec![Complex::new(F::zero(), F::zero()); rows];
    for mut col in data.columns_mut() {
        for (dst, src) in col_vec.iter_mut().zip(col.iter()) {
            *dst = *src;
        }
        col_plan.process(&mut col_vec);
        col.iter_mut().zip(col_vec.iter()).for_each(|(dst, src)| *dst = *src);
    }
}

/// Compute the unnormalized 2D FFT of a real array.
pub fn fft2d<F: L0Float>(input: ArrayView2<F>, plans: &SpectralPlans<F>) -> Array2<Complex<F>> {
    debug_assert_eq!(input.dim(), plans.dim());
    let mut data = input.mapv(|v| Complex::new(v, F::zero()));
    transform_inplace(&mut data, &plans.fft_row, &plans.fft_col);
    data
}

/// Compute the unnormalized 2D FFT of a complex array.
pub fn fft2d_complex<F: L0Float>(
    input: ArrayView2<Complex<F>>,
    plans: &SpectralPlans<F>,
) -> Array2<Complex<F>> {
    debug_assert_eq!(input.dim(), plans.dim());
    let mut data = input.to_owned();
    transform_inplace(&mut data, &plans.fft_row, &plans.fft_col);
    data
}

/// Compute the 2D inverse FFT, normalized by 1/(rows*cols).
pub fn ifft2d<F: L0Float>(
    input: ArrayView2<Complex<F>>,
    plans: &SpectralPlans<F>,
) -> Array2<Complex<F>> {
    debug_assert_eq!(input.dim(), plans.dim());
    let (rows, cols) = input.dim();
    let mut data = input.to_owned();
    transform_inplace(&mut data, &plans.ifft_row, &plans.ifft_col);

    let norm_factor = F::one() / F::usize_as(rows * cols);
    data.mapv_inplace(|v| v * norm_factor);
    data
}

/// 2D inverse FFT keeping only the real part.
pub fn ifft2d_real<F: L0Float>(input: ArrayView2<Complex<F>>, plans: &SpectralPlans<F>) -> Array2<F> {
    ifft2d(input, plans).mapv(|v| v.re)
}

/// Forward 2D FFT of every channel of a (rows, cols, channels) signal.
pub fn fft2d_channels<F: L0Float>(
    input: ArrayView3<F>,
    plans: &SpectralPlans<F>,
) -> Array3<Complex<F>> {
    let (rows, cols, channels) = input.dim();

    let spectra: Vec<Array2<Complex<F>>> = (0..channels)
        .into_par_iter()
        .map(|c| fft2d(input.index_axis(Axis(2), c), plans))
        .collect();

    let mut output = Array3::zeros((rows, cols, channels));
    for (c, spectrum) in spectra.into_iter().enumerate() {
        output.slice_mut(s![.., .., c]).assign(&spectrum);
    }
    output
}

/// Inverse 2D FFT of every channel, discarding the imaginary residual.
pub fn ifft2d_channels_real<F: L0Float>(
    input: ArrayView3<Complex<F>>,
    plans: &SpectralPlans<F>,
) -> Array3<F> {
    let (rows, cols, channels) = input.dim();

    let planes: Vec<Array2<F>> = (0..channels)
        .into_par_iter()
        .map(|c| ifft2d_real(input.index_axis(Axis(2), c), plans))
        .collect();

    let mut output = Array3::zeros((rows, cols, channels));
    for (c, plane) in planes.into_iter().enumerate() {
        output.slice_mut(s![.., .., c]).assign(&plane);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    // Helper: Simple Linear Congruential Generator for deterministic "random" test data
    struct SimpleLcg {
        state: u64,
    }

    impl SimpleLcg {
        fn new(seed: u64) -> Self {
            Self { state: seed }
        }

        fn next_u64(&mut self) -> u64 {
            self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
            self.state
        }

        fn next_f64(&mut self) -> f64 {
            // [-1.0, 1.0)
            let u = self.next_u64();
            ((u >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
        }
    }

    fn random_matrix_f64(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = SimpleLcg::new(seed);
        Array2::from_shape_fn((rows, cols), |_| rng.next_f64())
    }

    fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f64, f64::max)
    }

    /// Direct O(N^2 M^2) DFT used as a reference.
    fn naive_dft(input: &Array2<f64>) -> Array2<Complex<f64>> {
        let (rows, cols) = input.dim();
        Array2::from_shape_fn((rows, cols), |(u, v)| {
            let mut acc = Complex::new(0.0, 0.0);
            for r in 0..rows {
                for c in 0..cols {
                    let phase = -2.0
                        * std::f64::consts::PI
                        * ((u * r) as f64 / rows as f64 + (v * c) as f64 / cols as f64);
                    acc += Complex::new(phase.cos(), phase.sin()) * input[[r, c]];
                }
            }
            acc
        })
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_fft2d_roundtrip_various_sizes() {
        let sizes = [(2, 2), (4, 4), (8, 8), (5, 7), (16, 3), (3, 16)];

        for (rows, cols) in sizes {
            let input = random_matrix_f64(rows, cols, (rows * 1000 + cols) as u64);
            let plans = SpectralPlans::new(rows, cols);

            let freq = fft2d(input.view(), &plans);
            let output = ifft2d_real(freq.view(), &plans);

            let diff = max_abs_diff(&input, &output);
            assert!(
                diff < 1e-12,
                "FFT roundtrip failed for {}x{}: max diff = {}",
                rows,
                cols,
                diff
            );
        }
    }

    #[test]
    fn test_fft2d_roundtrip_f32() {
        let input = random_matrix_f64(8, 12, 7).mapv(|v| v as f32);
        let plans = SpectralPlans::<f32>::new(8, 12);

        let output = ifft2d_real(fft2d(input.view(), &plans).view(), &plans);

        for (a, b) in input.iter().zip(output.iter()) {
            assert!((a - b).abs() < 1e-5, "f32 roundtrip drift {} vs {}", a, b);
        }
    }

    // ==================== Known-Value Tests ====================

    #[test]
    fn test_fft2d_matches_naive_dft_non_square() {
        let input = random_matrix_f64(3, 5, 99);
        let plans = SpectralPlans::new(3, 5);

        let fast = fft2d(input.view(), &plans);
        let slow = naive_dft(&input);

        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).norm() < 1e-10, "fft {:?} != dft {:?}", a, b);
        }
    }

    #[test]
    fn test_fft2d_constant() {
        let input = Array2::<f64>::ones((4, 6));
        let plans = SpectralPlans::new(4, 6);

        let output = fft2d(input.view(), &plans);

        assert!((output[[0, 0]].re - 24.0).abs() < 1e-12);
        for ((r, c), val) in output.indexed_iter() {
            if r != 0 || c != 0 {
                assert!(val.norm() < 1e-12, "non-DC bin [{},{}] = {:?}", r, c, val);
            }
        }
    }

    #[test]
    fn test_fft2d_parseval() {
        let input = random_matrix_f64(8, 8, 42);
        let plans = SpectralPlans::new(8, 8);

        let output = fft2d(input.view(), &plans);

        let energy_spatial: f64 = input.iter().map(|x| x * x).sum();
        let energy_freq: f64 = output.iter().map(|x| x.norm_sqr()).sum();

        assert!(
            (energy_freq - energy_spatial * 64.0).abs() / (energy_spatial * 64.0) < 1e-10,
            "Parseval's theorem violated: spatial={}, freq={}",
            energy_spatial,
            energy_freq
        );
    }

    #[test]
    fn test_fft2d_complex_agrees_with_real_path() {
        let input = random_matrix_f64(6, 4, 5);
        let plans = SpectralPlans::new(6, 4);

        let complex_input = input.mapv(|v| Complex::new(v, 0.0));
        let a = fft2d(input.view(), &plans);
        let b = fft2d_complex(complex_input.view(), &plans);

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    // ==================== Multi-Channel Tests ====================

    #[test]
    fn test_channel_transforms_are_independent() {
        let (rows, cols) = (6, 5);
        let red = random_matrix_f64(rows, cols, 1);
        let green = random_matrix_f64(rows, cols, 2);
        let blue = random_matrix_f64(rows, cols, 3);

        let mut signal = Array3::<f64>::zeros((rows, cols, 3));
        signal.slice_mut(s![.., .., 0]).assign(&red);
        signal.slice_mut(s![.., .., 1]).assign(&green);
        signal.slice_mut(s![.., .., 2]).assign(&blue);

        let plans = SpectralPlans::new(rows, cols);
        let spectrum = fft2d_channels(signal.view(), &plans);

        assert_eq!(spectrum.dim(), (rows, cols, 3));
        for (c, plane) in [&red, &green, &blue].into_iter().enumerate() {
            let expected = fft2d(plane.view(), &plans);
            let got = spectrum.index_axis(Axis(2), c);
            for (x, y) in expected.iter().zip(got.iter()) {
                assert!((x - y).norm() < 1e-12, "channel {} mismatch", c);
            }
        }

        let back = ifft2d_channels_real(spectrum.view(), &plans);
        let diff = signal
            .iter()
            .zip(back.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f64, f64::max);
        assert!(diff < 1e-12, "channel roundtrip drift {}", diff);
    }
}
