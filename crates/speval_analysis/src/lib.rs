//! # speval_analysis
//!
//! Classification metrics for spiral-eval: binarization, overall and
//! per-class accuracy, confusion matrix, classification report, and
//! terminal chart rendering.
//!
//! All metric functions are pure and deterministic; the length
//! precondition between truth and predictions is checked before anything
//! is computed.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod chart;
mod confusion;
mod error;
mod evaluate;
mod report;

pub use chart::{confusion_heatmap, CurveChart, SeriesSummary};
pub use confusion::{confusion_matrix, ConfusionMatrix};
pub use error::{EvalError, Result};
pub use evaluate::{
    binarize, evaluate, overall_accuracy, per_class_accuracy, resolve_labels, ClassAccuracy,
    Evaluation, PredictionKind, DEFAULT_THRESHOLD,
};
pub use report::{classification_report, ClassMetrics, ClassificationReport};
