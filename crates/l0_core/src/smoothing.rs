//! L0 gradient minimization by half-quadratic splitting.
//!
//! Minimizes `|S - I|^2 + lambda * C(S)`, where `C` counts pixels with a
//! non-zero gradient. Auxiliary gradients `(h, v)` split the problem into two
//! closed-form subproblems solved alternately:
//!
//! 1. **Gradient subproblem** (spatial): hard-threshold the circular gradients
//!    of `S` at `lambda / beta`.
//! 2. **Signal subproblem** (frequency domain):
//!    `S = ifft((fft(I) + beta * fft(div(h, v))) / (1 + beta * (|Fx|^2 + |Fy|^2)))`
//!
//! `beta` starts at `2 * lambda` and grows by `kappa` until it reaches
//! `beta_max`, so the iteration count depends only on the configuration.

use log::{debug, info, warn};
use ndarray::{Array2, Array3, ArrayView3, ArrayViewD, Ix3, Zip};
use rustfft::num_complex::Complex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::L0Config;
use crate::error::L0Error;
use crate::float_trait::L0Float;
use crate::gradient::{
    broadcast_pixelwise_mut, circular_divergence, circular_gradients, threshold_gradients,
};
use crate::psf::DifferenceOperators;
use crate::transforms::{fft2d_channels, ifft2d_channels_real, SpectralPlans};

/// Smallest spatial extent accepted; the difference kernels span two samples.
const MIN_SPATIAL_EXTENT: usize = 2;

// =============================================================================
// Validation
// =============================================================================

/// Check that a signal is (rows >= 2, cols >= 2, channels in {1, 3}).
pub fn validate_signal_shape(dim: (usize, usize, usize)) -> Result<(), L0Error> {
    let (rows, cols, channels) = dim;
    if rows < MIN_SPATIAL_EXTENT || cols < MIN_SPATIAL_EXTENT {
        return Err(L0Error::InvalidShape(format!(
            "spatial size ({}, {}) is smaller than the difference kernel extent {}",
            rows, cols, MIN_SPATIAL_EXTENT
        )));
    }
    if channels != 1 && channels != 3 {
        return Err(L0Error::InvalidShape(format!(
            "expected 1 or 3 channels, got {}",
            channels
        )));
    }
    Ok(())
}

/// Interpret a dynamic-dimensional array as a (rows, cols, channels) signal.
pub fn as_signal<A>(input: ArrayViewD<'_, A>) -> Result<ArrayView3<'_, A>, L0Error> {
    let ndim = input.ndim();
    let view = input.into_dimensionality::<Ix3>().map_err(|_| {
        L0Error::InvalidShape(format!(
            "expected a 3-dimensional (rows, cols, channels) array, got {} dimensions",
            ndim
        ))
    })?;
    validate_signal_shape(view.dim())?;
    Ok(view)
}

fn all_finite<F: L0Float>(signal: ArrayView3<F>) -> bool {
    signal.iter().all(|v| v.is_finite())
}

// =============================================================================
// Spectral Setup
// =============================================================================

/// Quantities fixed for the whole run: FFT plans, the input spectrum and the
/// difference-operator denominator.
pub struct SpectralSetup<F: L0Float> {
    plans: SpectralPlans<F>,
    normin1: Array3<Complex<F>>,
    denormin2: Array2<F>,
}

impl<F: L0Float> SpectralSetup<F> {
    /// Plan the transforms and precompute `Normin1` and `Denormin2` for `signal`.
    pub fn new(signal: ArrayView3<F>) -> Result<Self, L0Error> {
        validate_signal_shape(signal.dim())?;
        let (rows, cols, _) = signal.dim();

        let plans = SpectralPlans::new(rows, cols);
        let operators = DifferenceOperators::new(&plans)?;
        let denormin2 = operators.denominator();
        let normin1 = fft2d_channels(signal, &plans);

        Ok(Self {
            plans,
            normin1,
            denormin2,
        })
    }

    /// Per-channel spectrum of the input signal.
    pub fn normin1(&self) -> &Array3<Complex<F>> {
        &self.normin1
    }

    /// `|otf_x|^2 + |otf_y|^2`, shared by every channel.
    pub fn denormin2(&self) -> &Array2<F> {
        &self.denormin2
    }

    pub fn plans(&self) -> &SpectralPlans<F> {
        &self.plans
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// One half-quadratic iteration at penalty weight `beta`, updating `signal`.
///
/// Returns the number of pixels whose gradients were zeroed.
pub fn half_quadratic_step<F: L0Float>(
    signal: &mut Array3<F>,
    setup: &SpectralSetup<F>,
    lambda: F,
    beta: F,
) -> usize {
    // Gradient subproblem
    let (mut h, mut v) = circular_gradients(signal.view());
    let zeroed = threshold_gradients(&mut h, &mut v, lambda / beta);

    // Signal subproblem
    let normin2 = circular_divergence(h.view(), v.view());
    let mut fs = fft2d_channels(normin2.view(), &setup.plans);

    Zip::from(&mut fs)
        .and(&setup.normin1)
        .par_for_each(|f, &n1| *f = n1 + *f * beta);
    broadcast_pixelwise_mut(&mut fs, setup.denormin2.view(), |f, d| {
        *f = *f / (F::one() + beta * d)
    });

    *signal = ifft2d_channels_real(fs.view(), &setup.plans);
    zeroed
}

/// Smooth a normalized signal with L0 gradient minimization.
///
/// `signal` is (rows, cols, channels) with values nominally in [0, 1].
///
/// # Example
///
/// ```
/// use l0_core::{l0_smooth, L0Config};
/// use ndarray::Array3;
///
/// let signal = Array3::<f64>::from_elem((16, 16, 3), 0.5);
/// let smoothed = l0_smooth(signal.view(), &L0Config::default()).unwrap();
/// assert_eq!(smoothed.dim(), (16, 16, 3));
/// ```
pub fn l0_smooth<F: L0Float>(
    signal: ArrayView3<F>,
    config: &L0Config<F>,
) -> Result<Array3<F>, L0Error> {
    l0_smooth_with_progress(signal, config, None, |_, _| {})
}

/// [`l0_smooth`] with cooperative cancellation and a progress callback.
///
/// `cancel` is polled before every iteration; once raised the run stops with
/// [`L0Error::Cancelled`]. `progress(iteration, total)` is called after each
/// completed iteration.
pub fn l0_smooth_with_progress<F, P>(
    signal: ArrayView3<F>,
    config: &L0Config<F>,
    cancel: Option<&AtomicBool>,
    mut progress: P,
) -> Result<Array3<F>, L0Error>
where
    F: L0Float,
    P: FnMut(usize, usize),
{
    config.validate()?;
    validate_signal_shape(signal.dim())?;
    if !all_finite(signal) {
        return Err(L0Error::NumericDefect { iteration: 0 });
    }

    let (rows, cols, channels) = signal.dim();
    let total = config.iteration_count();
    info!(
        "l0 smoothing {}x{}x{} lambda={:?} kappa={:?} beta_max={:?} iterations={}",
        rows, cols, channels, config.lambda, config.kappa, config.beta_max, total
    );

    let setup = SpectralSetup::new(signal)?;
    let mut smoothed = signal.to_owned();
    let mut beta = config.initial_beta();
    let mut iteration = 0usize;

    while beta < config.beta_max {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            info!("l0 smoothing cancelled at iteration {}/{}", iteration, total);
            return Err(L0Error::Cancelled { iteration });
        }

        let zeroed = half_quadratic_step(&mut smoothed, &setup, config.lambda, beta);
        iteration += 1;

        if !all_finite(smoothed.view()) {
            warn!(
                "non-finite values after iteration {} (beta={:?})",
                iteration, beta
            );
            return Err(L0Error::NumericDefect { iteration });
        }

        debug!(
            "iteration {}/{} beta={:?} zeroed_pixels={}/{}",
            iteration,
            total,
            beta,
            zeroed,
            rows * cols
        );
        progress(iteration, total);

        beta *= config.kappa;
    }

    Ok(smoothed)
}
