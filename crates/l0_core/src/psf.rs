//! Point-spread function to optical transfer function conversion.
//!
//! The solver works with the horizontal and vertical forward-difference
//! operators in the frequency domain. A kernel is zero-padded to the image
//! shape, circularly shifted so that its centre sits at (0, 0), then
//! transformed. Shifting before the transform gives the phase of a convolution
//! rather than a correlation.

use ndarray::{arr2, Array2, ArrayView2};
use rustfft::num_complex::Complex;

use crate::error::L0Error;
use crate::float_trait::L0Float;
use crate::transforms::{fft2d, SpectralPlans};

/// Zero-pad `psf` to `shape` and roll it so the kernel centre lands on (0, 0).
///
/// The centre of a kernel with extent `k` along an axis is `k / 2`, so each
/// axis is shifted by `-(k / 2)` with wrap-around.
pub fn circshift_kernel<F: L0Float>(
    psf: ArrayView2<F>,
    shape: (usize, usize),
) -> Result<Array2<F>, L0Error> {
    let (k_rows, k_cols) = psf.dim();
    let (rows, cols) = shape;

    if k_rows == 0 || k_cols == 0 {
        return Err(L0Error::InvalidShape(
            "point-spread function must not be empty".to_string(),
        ));
    }
    if k_rows > rows || k_cols > cols {
        return Err(L0Error::InvalidShape(format!(
            "kernel of size ({}, {}) does not fit in target shape ({}, {})",
            k_rows, k_cols, rows, cols
        )));
    }

    let (shift_r, shift_c) = (k_rows / 2, k_cols / 2);
    let mut shifted = Array2::zeros((rows, cols));
    for ((r, c), &tap) in psf.indexed_iter() {
        let dst_r = (r + rows - shift_r) % rows;
        let dst_c = (c + cols - shift_c) % cols;
        shifted[[dst_r, dst_c]] = tap;
    }
    Ok(shifted)
}

/// Convert a small spatial kernel into its transfer function at `plans.dim()`.
///
/// If the largest imaginary component is within the round-off expected from
/// the FFT (`n_ops * eps` relative to the largest magnitude), the imaginary
/// part is dropped, so symmetric kernels give exactly real transfer functions.
pub fn psf2otf_with_plans<F: L0Float>(
    psf: ArrayView2<F>,
    plans: &SpectralPlans<F>,
) -> Result<Array2<Complex<F>>, L0Error> {
    let shape = plans.dim();
    let shifted = circshift_kernel(psf, shape)?;

    if psf.iter().all(|&tap| tap == F::zero()) {
        return Ok(Array2::zeros(shape));
    }

    let mut otf = fft2d(shifted.view(), plans);

    let (rows, cols) = shape;
    let n_elem = F::usize_as(rows * cols);
    let n_ops = [rows, cols]
        .iter()
        .map(|&extent| n_elem * F::usize_as(extent).log2())
        .fold(F::zero(), |acc, x| acc + x);

    let max_imag = otf
        .iter()
        .map(|v| v.im.abs())
        .fold(F::zero(), |a, b| a.max(b));
    let max_mag = otf.iter().map(|v| v.norm()).fold(F::zero(), |a, b| a.max(b));

    if max_imag <= n_ops * F::EPSILON * max_mag {
        otf.mapv_inplace(|v| Complex::new(v.re, F::zero()));
    }

    Ok(otf)
}

/// Convert a small spatial kernel into its transfer function of size `shape`.
pub fn psf2otf<F: L0Float>(
    psf: ArrayView2<F>,
    shape: (usize, usize),
) -> Result<Array2<Complex<F>>, L0Error> {
    let plans = SpectralPlans::new(shape.0, shape.1);
    psf2otf_with_plans(psf, &plans)
}

/// Horizontal `[-1, 1]` forward-difference kernel.
pub fn horizontal_kernel<F: L0Float>() -> Array2<F> {
    arr2(&[[-F::one(), F::one()]])
}

/// Vertical `[-1; 1]` forward-difference kernel.
pub fn vertical_kernel<F: L0Float>() -> Array2<F> {
    arr2(&[[-F::one()], [F::one()]])
}

/// Transfer functions of the two circular forward-difference operators.
pub struct DifferenceOperators<F: L0Float> {
    pub horizontal: Array2<Complex<F>>,
    pub vertical: Array2<Complex<F>>,
}

impl<F: L0Float> DifferenceOperators<F> {
    pub fn new(plans: &SpectralPlans<F>) -> Result<Self, L0Error> {
        Ok(Self {
            horizontal: psf2otf_with_plans(horizontal_kernel::<F>().view(), plans)?,
            vertical: psf2otf_with_plans(vertical_kernel::<F>().view(), plans)?,
        })
    }

    /// `|otf_x|^2 + |otf_y|^2`, the frequency response of the gradient normal operator.
    pub fn denominator(&self) -> Array2<F> {
        let mut out = self.horizontal.mapv(|v| v.norm_sqr());
        out.zip_mut_with(&self.vertical, |acc, v| *acc += v.norm_sqr());
        out
    }
}
