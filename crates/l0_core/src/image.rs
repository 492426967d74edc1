//! Conversion between 8-bit images and normalized signals.

use ndarray::{Array3, ArrayView3};

use crate::config::L0Config;
use crate::error::L0Error;
use crate::float_trait::L0Float;
use crate::smoothing::l0_smooth;

const U8_MAX: f64 = 255.0;

/// Cast an 8-bit (rows, cols, channels) image to a signal in [0, 1].
pub fn signal_from_u8<F: L0Float>(image: ArrayView3<u8>) -> Array3<F> {
    let max = F::from_f64_c(U8_MAX);
    image.mapv(|px| F::usize_as(px as usize) / max)
}

/// Rescale a signal to [0, 255], clamping out-of-range values and rounding
/// to the nearest integer.
pub fn signal_to_u8<F: L0Float>(signal: ArrayView3<F>) -> Array3<u8> {
    let max = F::from_f64_c(U8_MAX);
    signal.mapv(|x| {
        let scaled = (x * max).max(F::zero()).min(max).round();
        scaled.to_u8().unwrap_or(0)
    })
}

/// Smooth an 8-bit image end to end: normalize, solve, rescale.
pub fn l0_smooth_u8<F: L0Float>(
    image: ArrayView3<u8>,
    config: &L0Config<F>,
) -> Result<Array3<u8>, L0Error> {
    let signal = signal_from_u8::<F>(image);
    let smoothed = l0_smooth(signal.view(), config)?;
    Ok(signal_to_u8(smoothed.view()))
}
