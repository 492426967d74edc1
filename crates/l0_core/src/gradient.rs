//! Circular finite differences on (rows, cols, channels) signals.
//!
//! Forward differences and their adjoint (negative backward divergence) with
//! periodic boundaries, so they agree exactly with the transfer functions
//! built in [`crate::psf`].

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

use crate::float_trait::L0Float;

/// Forward differences `(h, v)` with wrap-around.
///
/// `h[i, j, c] = s[i, (j + 1) % cols, c] - s[i, j, c]`
/// `v[i, j, c] = s[(i + 1) % rows, j, c] - s[i, j, c]`
pub fn circular_gradients<F: L0Float>(signal: ArrayView3<F>) -> (Array3<F>, Array3<F>) {
    let (rows, cols, channels) = signal.dim();

    let h = Array3::from_shape_fn((rows, cols, channels), |(i, j, c)| {
        signal[[i, (j + 1) % cols, c]] - signal[[i, j, c]]
    });
    let v = Array3::from_shape_fn((rows, cols, channels), |(i, j, c)| {
        signal[[(i + 1) % rows, j, c]] - signal[[i, j, c]]
    });

    (h, v)
}

/// Channel-summed gradient energy `sum_c h^2 + v^2` per pixel.
pub fn gradient_energy<F: L0Float>(h: ArrayView3<F>, v: ArrayView3<F>) -> Array2<F> {
    let mut energy = Array2::zeros((h.dim().0, h.dim().1));
    Zip::from(&mut energy)
        .and(h.lanes(Axis(2)))
        .and(v.lanes(Axis(2)))
        .for_each(|e, h_px, v_px| {
            *e = h_px
                .iter()
                .zip(v_px.iter())
                .map(|(&a, &b)| a * a + b * b)
                .sum();
        });
    energy
}

/// Hard-threshold the auxiliary gradients in place.
///
/// Every pixel whose channel-summed energy is strictly below `threshold` has
/// both `h` and `v` zeroed across all channels. This is the exact minimizer of
/// the L0 term plus the quadratic coupling for fixed signal and penalty weight.
/// Returns the number of zeroed pixels.
pub fn threshold_gradients<F: L0Float>(h: &mut Array3<F>, v: &mut Array3<F>, threshold: F) -> usize {
    let energy = gradient_energy(h.view(), v.view());
    let mut zeroed = 0usize;

    Zip::from(&energy)
        .and(h.lanes_mut(Axis(2)))
        .and(v.lanes_mut(Axis(2)))
        .for_each(|&e, mut h_px, mut v_px| {
            if e < threshold {
                h_px.fill(F::zero());
                v_px.fill(F::zero());
                zeroed += 1;
            }
        });

    zeroed
}

/// Adjoint of [`circular_gradients`] applied to `(h, v)`.
///
/// `out[i, j, c] = h[i, j-1, c] - h[i, j, c] + v[i-1, j, c] - v[i, j, c]`
/// with indices taken modulo the image size.
pub fn circular_divergence<F: L0Float>(h: ArrayView3<F>, v: ArrayView3<F>) -> Array3<F> {
    let (rows, cols, channels) = h.dim();
    debug_assert_eq!(v.dim(), h.dim());

    Array3::from_shape_fn((rows, cols, channels), |(i, j, c)| {
        let j_prev = (j + cols - 1) % cols;
        let i_prev = (i + rows - 1) % rows;
        (h[[i, j_prev, c]] - h[[i, j, c]]) + (v[[i_prev, j, c]] - v[[i, j, c]])
    })
}

/// Apply a per-pixel weight to every channel of that pixel.
///
/// `f(&mut target[[i, j, c]], weights[[i, j]])` for all `c`; shapes must agree
/// on (rows, cols).
pub fn broadcast_pixelwise_mut<T, W, Func>(target: &mut Array3<T>, weights: ArrayView2<W>, mut f: Func)
where
    W: Copy,
    Func: FnMut(&mut T, W),
{
    Zip::from(target.lanes_mut(Axis(2)))
        .and(&weights)
        .for_each(|mut px, &w| px.iter_mut().for_each(|t| f(t, w)));
}
