//! The evaluator: binarization, accuracy metrics, and the bundled
//! evaluation of one prediction snapshot against the ground truth.
//!
//! All functions here are pure: deterministic for identical inputs, no
//! hidden state, no side effects.

use serde::{Deserialize, Serialize};

use crate::confusion::{confusion_matrix, ConfusionMatrix};
use crate::error::{EvalError, Result};

/// Default binarization threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// How the predicted values of a snapshot are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PredictionKind {
    /// Binary-case probabilities in [0, 1], thresholded into {0, 1}.
    Probability {
        /// Values strictly greater than this map to class 1.
        threshold: f64,
    },
    /// Discrete class labels stored as floats.
    Label,
}

impl Default for PredictionKind {
    fn default() -> Self {
        PredictionKind::Probability {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Map a probability to a class label.
///
/// Strictly-greater comparison: `p > threshold` yields 1, otherwise 0.
/// The boundary `p == threshold` therefore maps to 0.
#[must_use]
pub fn binarize(p: f64, threshold: f64) -> i64 {
    if p > threshold {
        1
    } else {
        0
    }
}

/// Resolve raw predicted values into discrete labels.
///
/// Probabilities are binarized; label-kind values are rounded to the
/// nearest integer.
#[must_use]
pub fn resolve_labels(predictions: &[f64], kind: PredictionKind) -> Vec<i64> {
    match kind {
        PredictionKind::Probability { threshold } => predictions
            .iter()
            .map(|&p| binarize(p, threshold))
            .collect(),
        PredictionKind::Label => predictions.iter().map(|&p| p.round() as i64).collect(),
    }
}

fn check_lengths(truth: &[i64], predicted: &[i64]) -> Result<()> {
    if truth.len() != predicted.len() {
        return Err(EvalError::LengthMismatch {
            truth: truth.len(),
            predictions: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(EvalError::EmptyRun);
    }
    Ok(())
}

/// Fraction of samples whose predicted label equals the true label.
///
/// # Errors
///
/// [`EvalError::LengthMismatch`] when the sequences differ in length,
/// [`EvalError::EmptyRun`] when both are empty. The check runs before any
/// counting.
pub fn overall_accuracy(truth: &[i64], predicted: &[i64]) -> Result<f64> {
    check_lengths(truth, predicted)?;

    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Accuracy restricted to samples whose true label equals `class`.
///
/// Returns `Ok(None)` when the class never occurs in `truth`; the
/// reference behavior is undefined there, and skipping the class is this
/// implementation's documented policy.
pub fn per_class_accuracy(truth: &[i64], predicted: &[i64], class: i64) -> Result<Option<f64>> {
    check_lengths(truth, predicted)?;

    let mut correct = 0usize;
    let mut total = 0usize;
    for (&t, &p) in truth.iter().zip(predicted) {
        if t == class {
            total += 1;
            if p == t {
                correct += 1;
            }
        }
    }

    if total == 0 {
        Ok(None)
    } else {
        Ok(Some(correct as f64 / total as f64))
    }
}

/// Per-class accuracy entry of an [`Evaluation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassAccuracy {
    /// Class label.
    pub class: i64,
    /// Accuracy over samples of this class.
    pub accuracy: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

/// Bundled metrics for one prediction snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Number of evaluated samples.
    pub n_samples: usize,
    /// How the predictions were interpreted.
    pub kind: PredictionKind,
    /// Overall accuracy in [0, 1].
    pub accuracy: f64,
    /// Accuracy per observed true class, ordered by label.
    pub per_class: Vec<ClassAccuracy>,
    /// Full cross-tabulation of true vs. predicted labels.
    pub confusion: ConfusionMatrix,
}

/// Evaluate one snapshot of predicted values against the ground truth.
///
/// The length precondition is checked once, before any metric is
/// computed; a mismatch produces no partial results.
///
/// # Arguments
///
/// * `truth` - True class labels
/// * `predictions` - Raw predicted values (probabilities or labels)
/// * `kind` - How to interpret `predictions`
///
/// # Errors
///
/// [`EvalError::LengthMismatch`] or [`EvalError::EmptyRun`].
pub fn evaluate(truth: &[i64], predictions: &[f64], kind: PredictionKind) -> Result<Evaluation> {
    if truth.len() != predictions.len() {
        return Err(EvalError::LengthMismatch {
            truth: truth.len(),
            predictions: predictions.len(),
        });
    }
    if truth.is_empty() {
        return Err(EvalError::EmptyRun);
    }

    let predicted = resolve_labels(predictions, kind);
    let accuracy = overall_accuracy(truth, &predicted)?;
    let confusion = confusion_matrix(truth, &predicted)?;

    let mut observed: Vec<i64> = truth.to_vec();
    observed.sort_unstable();
    observed.dedup();

    let mut per_class = Vec::with_capacity(observed.len());
    for class in observed {
        if let Some(acc) = per_class_accuracy(truth, &predicted, class)? {
            per_class.push(ClassAccuracy {
                class,
                accuracy: acc,
                support: confusion.support(class),
            });
        }
    }

    Ok(Evaluation {
        n_samples: truth.len(),
        kind,
        accuracy,
        per_class,
        confusion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_boundary() {
        assert_eq!(binarize(0.5, DEFAULT_THRESHOLD), 0);
        assert_eq!(binarize(0.5000001, DEFAULT_THRESHOLD), 1);
        assert_eq!(binarize(0.0, DEFAULT_THRESHOLD), 0);
        assert_eq!(binarize(1.0, DEFAULT_THRESHOLD), 1);
    }

    #[test]
    fn test_binarize_monotonic() {
        let probs = [0.0, 0.1, 0.3, 0.5, 0.50001, 0.7, 0.9, 1.0];
        for pair in probs.windows(2) {
            assert!(binarize(pair[0], 0.5) <= binarize(pair[1], 0.5));
        }
    }

    #[test]
    fn test_binarize_custom_threshold() {
        assert_eq!(binarize(0.6, 0.7), 0);
        assert_eq!(binarize(0.8, 0.7), 1);
    }

    #[test]
    fn test_resolve_labels_rounds() {
        let resolved = resolve_labels(&[0.0, 1.0, 2.0, 1.9], PredictionKind::Label);
        assert_eq!(resolved, vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_overall_accuracy_self_is_one() {
        let truth = vec![0, 1, 2, 1, 0, 2, 2];
        let acc = overall_accuracy(&truth, &truth).unwrap();
        assert!((acc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overall_accuracy_length_mismatch() {
        let err = overall_accuracy(&[0, 1, 2], &[0, 1]).unwrap_err();
        assert!(matches!(err, EvalError::LengthMismatch { .. }));
    }

    #[test]
    fn test_per_class_accuracy() {
        let truth = vec![0, 1, 1, 0];
        let predicted = vec![0, 1, 0, 0];

        let class0 = per_class_accuracy(&truth, &predicted, 0).unwrap();
        let class1 = per_class_accuracy(&truth, &predicted, 1).unwrap();

        assert_eq!(class0, Some(1.0));
        assert_eq!(class1, Some(0.5));
    }

    #[test]
    fn test_per_class_accuracy_absent_class() {
        let truth = vec![0, 0, 1];
        let predicted = vec![0, 0, 1];
        assert_eq!(per_class_accuracy(&truth, &predicted, 7).unwrap(), None);
    }

    #[test]
    fn test_evaluate_spec_example() {
        // T = [0,1,1,0], P = [0.2,0.7,0.4,0.1]: binarized [0,1,0,0],
        // accuracy 0.75, matrix [[2,0],[1,1]].
        let truth = vec![0, 1, 1, 0];
        let predictions = vec![0.2, 0.7, 0.4, 0.1];

        let eval = evaluate(&truth, &predictions, PredictionKind::default()).unwrap();

        assert!((eval.accuracy - 0.75).abs() < 1e-12);
        assert_eq!(eval.confusion.labels, vec![0, 1]);
        assert_eq!(eval.confusion.matrix, vec![vec![2, 0], vec![1, 1]]);
        assert_eq!(eval.per_class.len(), 2);
        assert!((eval.per_class[0].accuracy - 1.0).abs() < 1e-12);
        assert!((eval.per_class[1].accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_label_kind() {
        let truth = vec![0, 1, 2, 2];
        let predictions = vec![0.0, 1.0, 2.0, 1.0];

        let eval = evaluate(&truth, &predictions, PredictionKind::Label).unwrap();

        assert!((eval.accuracy - 0.75).abs() < 1e-12);
        assert_eq!(eval.confusion.labels, vec![0, 1, 2]);
        assert_eq!(eval.confusion.count(2, 1), 1);
    }

    #[test]
    fn test_evaluate_checks_length_first() {
        let err = evaluate(&[0, 1], &[0.5], PredictionKind::default()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::LengthMismatch {
                truth: 2,
                predictions: 1
            }
        ));
    }

    #[test]
    fn test_evaluate_empty_run() {
        let err = evaluate(&[], &[], PredictionKind::default()).unwrap_err();
        assert!(matches!(err, EvalError::EmptyRun));
    }

    #[test]
    fn test_per_class_support_matches_row_sums() {
        let truth = vec![0, 0, 0, 1];
        let predictions = vec![0.1, 0.9, 0.2, 0.8];

        let eval = evaluate(&truth, &predictions, PredictionKind::default()).unwrap();

        for entry in &eval.per_class {
            assert_eq!(entry.support, eval.confusion.support(entry.class));
        }
    }
}
