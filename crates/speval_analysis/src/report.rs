//! Classification report with per-class metrics.
//!
//! Per-class precision, recall, and F1, with macro and weighted averages,
//! all derived from a confusion matrix.

use serde::{Deserialize, Serialize};

use crate::confusion::{confusion_matrix, ConfusionMatrix};
use crate::error::Result;

/// Per-class classification metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Class label.
    pub class: i64,
    /// Precision: TP / (TP + FP)
    pub precision: f64,
    /// Recall: TP / (TP + FN)
    pub recall: f64,
    /// F1-Score: 2 * (precision * recall) / (precision + recall)
    pub f1_score: f64,
    /// Support: number of true instances of this class
    pub support: usize,
}

/// Classification report with per-class and aggregate metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Per-class metrics, ordered by label.
    pub classes: Vec<ClassMetrics>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Macro-averaged precision (unweighted mean over supported classes).
    pub macro_precision: f64,
    /// Macro-averaged recall.
    pub macro_recall: f64,
    /// Macro-averaged F1.
    pub macro_f1: f64,
    /// Support-weighted precision.
    pub weighted_precision: f64,
    /// Support-weighted recall.
    pub weighted_recall: f64,
    /// Support-weighted F1.
    pub weighted_f1: f64,
    /// Total number of samples.
    pub total_samples: usize,
}

impl ClassificationReport {
    /// Derive the report from a confusion matrix.
    #[must_use]
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let n = cm.n_classes();
        let mut classes = Vec::with_capacity(n);

        for (i, &label) in cm.labels.iter().enumerate() {
            let tp = cm.matrix[i][i];
            let fp: usize = (0..n).filter(|&r| r != i).map(|r| cm.matrix[r][i]).sum();
            let fn_: usize = (0..n).filter(|&c| c != i).map(|c| cm.matrix[i][c]).sum();
            let support = tp + fn_;

            let precision = if tp + fp > 0 {
                tp as f64 / (tp + fp) as f64
            } else {
                0.0
            };
            let recall = if support > 0 {
                tp as f64 / support as f64
            } else {
                0.0
            };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            classes.push(ClassMetrics {
                class: label,
                precision,
                recall,
                f1_score: f1,
                support,
            });
        }

        let supported: Vec<&ClassMetrics> =
            classes.iter().filter(|c| c.support > 0).collect();
        let n_supported = supported.len() as f64;

        let (macro_precision, macro_recall, macro_f1) = if supported.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                supported.iter().map(|c| c.precision).sum::<f64>() / n_supported,
                supported.iter().map(|c| c.recall).sum::<f64>() / n_supported,
                supported.iter().map(|c| c.f1_score).sum::<f64>() / n_supported,
            )
        };

        let total_samples: usize = classes.iter().map(|c| c.support).sum();
        let (weighted_precision, weighted_recall, weighted_f1) = if total_samples == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let t = total_samples as f64;
            (
                classes.iter().map(|c| c.precision * c.support as f64).sum::<f64>() / t,
                classes.iter().map(|c| c.recall * c.support as f64).sum::<f64>() / t,
                classes.iter().map(|c| c.f1_score * c.support as f64).sum::<f64>() / t,
            )
        };

        Self {
            classes,
            accuracy: cm.accuracy(),
            macro_precision,
            macro_recall,
            macro_f1,
            weighted_precision,
            weighted_recall,
            weighted_f1,
            total_samples,
        }
    }

    /// Display the report as a formatted string.
    pub fn to_string_table(&self) -> String {
        let mut output = String::new();

        output.push_str("              precision    recall  f1-score   support\n\n");

        for class in &self.classes {
            output.push_str(&format!(
                "{:>12}       {:.2}      {:.2}      {:.2}     {:5}\n",
                format!("Class {}", class.class),
                class.precision,
                class.recall,
                class.f1_score,
                class.support
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "{:>12}                           {:.2}     {:5}\n",
            "accuracy", self.accuracy, self.total_samples
        ));
        output.push_str(&format!(
            "{:>12}       {:.2}      {:.2}      {:.2}     {:5}\n",
            "macro avg",
            self.macro_precision,
            self.macro_recall,
            self.macro_f1,
            self.total_samples
        ));
        output.push_str(&format!(
            "{:>12}       {:.2}      {:.2}      {:.2}     {:5}\n",
            "weighted avg",
            self.weighted_precision,
            self.weighted_recall,
            self.weighted_f1,
            self.total_samples
        ));

        output
    }

    /// Get the class with lowest F1-score (worst performing).
    pub fn worst_class(&self) -> Option<&ClassMetrics> {
        self.classes
            .iter()
            .filter(|c| c.support > 0)
            .min_by(|a, b| a.f1_score.total_cmp(&b.f1_score))
    }

    /// Get the class with highest F1-score (best performing).
    pub fn best_class(&self) -> Option<&ClassMetrics> {
        self.classes
            .iter()
            .filter(|c| c.support > 0)
            .max_by(|a, b| a.f1_score.total_cmp(&b.f1_score))
    }
}

/// Compute a classification report from true and predicted labels.
///
/// # Errors
///
/// Propagates the length/emptiness checks of [`confusion_matrix`].
pub fn classification_report(truth: &[i64], predicted: &[i64]) -> Result<ClassificationReport> {
    let cm = confusion_matrix(truth, predicted)?;
    Ok(ClassificationReport::from_confusion(&cm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_perfect() {
        let truth = vec![0, 1, 2, 0, 1, 2];

        let report = classification_report(&truth, &truth).unwrap();

        assert!((report.accuracy - 1.0).abs() < 1e-12);
        assert!((report.macro_f1 - 1.0).abs() < 1e-12);
        assert_eq!(report.total_samples, 6);
        assert_eq!(report.classes.len(), 3);
    }

    #[test]
    fn test_report_binary() {
        let truth = vec![0, 1, 1, 1, 0, 0];
        let predicted = vec![0, 0, 1, 1, 1, 0];

        let report = classification_report(&truth, &predicted).unwrap();

        // 4/6 correct
        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(report.classes.len(), 2);
    }

    #[test]
    fn test_report_agrees_with_confusion() {
        let truth = vec![0, 0, 1, 1, 2, 2];
        let predicted = vec![0, 1, 1, 1, 2, 0];

        let cm = confusion_matrix(&truth, &predicted).unwrap();
        let report = ClassificationReport::from_confusion(&cm);

        for metrics in &report.classes {
            assert_eq!(metrics.support, cm.support(metrics.class));
        }
        assert!((report.accuracy - cm.accuracy()).abs() < 1e-12);
    }

    #[test]
    fn test_report_precision_recall_values() {
        // Class 0: tp=1, fp=1 (one true 1 predicted as 0), fn=1.
        let truth = vec![0, 0, 1, 1];
        let predicted = vec![0, 1, 0, 1];

        let report = classification_report(&truth, &predicted).unwrap();

        let class0 = &report.classes[0];
        assert!((class0.precision - 0.5).abs() < 1e-12);
        assert!((class0.recall - 0.5).abs() < 1e-12);
        assert!((class0.f1_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_report_display() {
        let truth = vec![0, 1, 2];
        let report = classification_report(&truth, &truth).unwrap();
        let table = report.to_string_table();

        assert!(table.contains("precision"));
        assert!(table.contains("recall"));
        assert!(table.contains("f1-score"));
        assert!(table.contains("macro avg"));
        assert!(table.contains("weighted avg"));
    }

    #[test]
    fn test_worst_best_class() {
        let truth = vec![0, 0, 0, 1, 1, 2];
        let predicted = vec![0, 0, 0, 1, 0, 2];

        let report = classification_report(&truth, &predicted).unwrap();

        let worst = report.worst_class().unwrap();
        let best = report.best_class().unwrap();
        assert!(best.f1_score >= worst.f1_score);
        assert_eq!(worst.class, 1);
    }
}
