//! Confusion matrix computation.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Confusion matrix for classification evaluation.
///
/// Rows are true classes, columns are predicted classes, both ordered by
/// the sorted set of labels observed in the evaluated sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Sorted class labels; index in this vector is the matrix index.
    pub labels: Vec<i64>,
    /// The matrix values (row = true, col = pred).
    pub matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Create a zeroed matrix over a label set.
    ///
    /// Labels are sorted and deduplicated; matrix indices follow that
    /// order.
    pub fn new(mut labels: Vec<i64>) -> Self {
        labels.sort_unstable();
        labels.dedup();
        let n = labels.len();
        Self {
            labels,
            matrix: vec![vec![0; n]; n],
        }
    }

    /// Number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Add one (true, predicted) observation.
    ///
    /// Labels outside the matrix label set are ignored.
    pub fn add(&mut self, true_label: i64, pred_label: i64) {
        let row = self.labels.binary_search(&true_label).ok();
        let col = self.labels.binary_search(&pred_label).ok();
        if let (Some(r), Some(c)) = (row, col) {
            self.matrix[r][c] += 1;
        }
    }

    /// Count for a (true, predicted) label pair.
    #[must_use]
    pub fn count(&self, true_label: i64, pred_label: i64) -> usize {
        let row = self.labels.binary_search(&true_label).ok();
        let col = self.labels.binary_search(&pred_label).ok();
        match (row, col) {
            (Some(r), Some(c)) => self.matrix[r][c],
            _ => 0,
        }
    }

    /// Number of true occurrences of a class (row sum).
    #[must_use]
    pub fn support(&self, label: i64) -> usize {
        match self.labels.binary_search(&label) {
            Ok(r) => self.matrix[r].iter().sum(),
            Err(_) => 0,
        }
    }

    /// Total number of tallied samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Overall accuracy (diagonal mass over total).
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Normalize the matrix row-wise (each row shows per-class recall).
    #[must_use]
    pub fn normalize(&self) -> Vec<Vec<f64>> {
        self.matrix
            .iter()
            .map(|row| {
                let sum: usize = row.iter().sum();
                if sum == 0 {
                    vec![0.0; self.n_classes()]
                } else {
                    row.iter().map(|&v| v as f64 / sum as f64).collect()
                }
            })
            .collect()
    }

    /// Get a plain-text representation.
    pub fn to_string_table(&self) -> String {
        let mut s = String::new();

        // Header
        s.push_str("        ");
        for label in &self.labels {
            s.push_str(&format!("{:>8}", label));
        }
        s.push('\n');

        // Rows
        for (i, label) in self.labels.iter().enumerate() {
            s.push_str(&format!("{:>7} ", label));
            for j in 0..self.n_classes() {
                s.push_str(&format!("{:>8}", self.matrix[i][j]));
            }
            s.push('\n');
        }

        s
    }
}

/// Compute a confusion matrix from true and predicted labels.
///
/// The label set is the sorted union of the labels observed in `truth` and
/// `predicted`, so every sample is tallied and each row sums to the number
/// of true occurrences of its class.
///
/// # Arguments
///
/// * `truth` - True class labels
/// * `predicted` - Predicted class labels, same length
///
/// # Errors
///
/// [`EvalError::LengthMismatch`] when the sequences differ in length,
/// [`EvalError::EmptyRun`] when both are empty.
pub fn confusion_matrix(truth: &[i64], predicted: &[i64]) -> Result<ConfusionMatrix> {
    if truth.len() != predicted.len() {
        return Err(EvalError::LengthMismatch {
            truth: truth.len(),
            predictions: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(EvalError::EmptyRun);
    }

    let mut labels: Vec<i64> = truth.iter().chain(predicted.iter()).copied().collect();
    labels.sort_unstable();
    labels.dedup();

    let mut cm = ConfusionMatrix::new(labels);
    for (&t, &p) in truth.iter().zip(predicted) {
        cm.add(t, p);
    }
    Ok(cm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_counts() {
        let truth = vec![0, 1, 1, 1, 2, 0];
        let predicted = vec![0, 0, 1, 1, 2, 2];

        let cm = confusion_matrix(&truth, &predicted).unwrap();

        assert_eq!(cm.labels, vec![0, 1, 2]);
        assert_eq!(cm.count(0, 0), 1);
        assert_eq!(cm.count(1, 0), 1);
        assert_eq!(cm.count(1, 1), 2);
        assert_eq!(cm.count(0, 2), 1);
    }

    #[test]
    fn test_spec_example() {
        // T = [0,1,1,0] with binarized P = [0,1,0,0].
        let truth = vec![0, 1, 1, 0];
        let predicted = vec![0, 1, 0, 0];

        let cm = confusion_matrix(&truth, &predicted).unwrap();

        assert_eq!(cm.labels, vec![0, 1]);
        assert_eq!(cm.matrix, vec![vec![2, 0], vec![1, 1]]);
    }

    #[test]
    fn test_row_sums_match_support() {
        let truth = vec![0, 0, 1, 1, 1, 2];
        let predicted = vec![1, 0, 1, 2, 1, 0];

        let cm = confusion_matrix(&truth, &predicted).unwrap();

        for &label in &cm.labels {
            let expected = truth.iter().filter(|&&t| t == label).count();
            assert_eq!(cm.support(label), expected);
        }
        assert_eq!(cm.total(), truth.len());
    }

    #[test]
    fn test_accuracy_perfect() {
        let truth = vec![0, 1, 2];
        let cm = confusion_matrix(&truth, &truth).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let err = confusion_matrix(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::LengthMismatch {
                truth: 2,
                predictions: 1
            }
        ));
    }

    #[test]
    fn test_empty_run() {
        let err = confusion_matrix(&[], &[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyRun));
    }

    #[test]
    fn test_novel_predicted_label_keeps_row_sums() {
        // A predicted label never seen in truth widens the matrix instead
        // of dropping the sample.
        let truth = vec![0, 0];
        let predicted = vec![3, 0];

        let cm = confusion_matrix(&truth, &predicted).unwrap();

        assert_eq!(cm.labels, vec![0, 3]);
        assert_eq!(cm.support(0), 2);
        assert_eq!(cm.support(3), 0);
    }

    #[test]
    fn test_normalize_rows() {
        let truth = vec![0, 0, 1, 1];
        let predicted = vec![0, 1, 1, 1];

        let cm = confusion_matrix(&truth, &predicted).unwrap();
        let norm = cm.normalize();

        assert!((norm[0][0] - 0.5).abs() < 1e-12);
        assert!((norm[0][1] - 0.5).abs() < 1e-12);
        assert!((norm[1][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_string_table_contains_labels() {
        let cm = confusion_matrix(&[0, 1], &[0, 1]).unwrap();
        let table = cm.to_string_table();
        assert!(table.contains('0'));
        assert!(table.contains('1'));
    }
}
