/// Errors produced by the L0 smoothing pipeline.
///
/// Shape and parameter errors are raised before any spectral work is done.
/// Once the iteration has started the only possible failures are a numeric
/// defect or a cooperative cancellation; neither returns a partial result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum L0Error {
    /// The signal is not (rows, cols, channels) or is too small for the difference kernels.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A solver parameter would make the schedule degenerate or unbounded.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// NaN or infinity appeared in the signal.
    #[error("non-finite value in signal after iteration {iteration}")]
    NumericDefect { iteration: usize },

    /// The caller raised the cancel flag between iterations.
    #[error("smoothing cancelled before iteration {iteration}")]
    Cancelled { iteration: usize },
}
