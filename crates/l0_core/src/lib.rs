//! L0 Gradient Smoothing Core Library
//!
//! Pure Rust implementation of edge-preserving image smoothing by L0 gradient
//! minimization, solved with half-quadratic splitting in the frequency domain.
//! This crate contains all algorithm logic without Python bindings or image
//! file I/O.

pub mod config;
pub mod error;
pub mod float_trait;
pub mod gradient;
pub mod image;
pub mod psf;
pub mod smoothing;
pub mod transforms;

// Re-export commonly used types at the crate root
pub use config::L0Config;
pub use error::L0Error;
pub use float_trait::L0Float;
pub use image::{l0_smooth_u8, signal_from_u8, signal_to_u8};
pub use psf::{psf2otf, DifferenceOperators};
pub use smoothing::{as_signal, l0_smooth, l0_smooth_with_progress, SpectralSetup};
pub use transforms::{fft2d, ifft2d, SpectralPlans};
