//! Error types for speval_analysis.

use thiserror::Error;

/// Result type alias using [`EvalError`].
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur during evaluation.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Truth and prediction sequences differ in length.
    ///
    /// Checked before any metric is computed; no partial results exist
    /// once this is raised.
    #[error("length mismatch: {truth} true labels but {predictions} predictions")]
    LengthMismatch {
        /// Length of the true-label sequence.
        truth: usize,
        /// Length of the prediction sequence.
        predictions: usize,
    },

    /// The run contains no samples.
    #[error("run contains no samples")]
    EmptyRun,
}
