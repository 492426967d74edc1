//! Float trait abstraction for f32/f64 support.
//!
//! Every solver stage is generic over [`L0Float`], so the same code path runs
//! in single or double precision. Double precision is what the u8 helpers use.

use num_traits::{Float, FromPrimitive, NumAssign};
use rustfft::FftNum;
use std::fmt::Debug;
use std::iter::Sum;

/// Floating point types supported by the L0 solver.
///
/// Combines the bounds needed across the pipeline:
/// - Basic float operations (Float, NumAssign)
/// - FFT compatibility (FftNum from rustfft)
/// - Conversion from primitive types (FromPrimitive)
/// - Reductions (Sum)
pub trait L0Float:
    Float + FftNum + FromPrimitive + NumAssign + Sum + Debug + Send + Sync + 'static
{
    /// Machine epsilon, used for the transfer-function noise floor.
    const EPSILON: Self;

    /// Create a value from an f64 constant.
    fn from_f64_c(val: f64) -> Self;

    /// Create a value from a usize constant.
    fn usize_as(val: usize) -> Self;
}

impl L0Float for f32 {
    const EPSILON: Self = f32::EPSILON;

    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f32
    }
}

impl L0Float for f64 {
    const EPSILON: Self = f64::EPSILON;

    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f64
    }
}
