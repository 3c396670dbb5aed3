//! Loading of the CSV tables a training run leaves behind.
//!
//! A run directory holds four comma-separated files, each with one header
//! row: `true_data.csv` (ground-truth labels, column `y`),
//! `predictions.csv` (one row of per-sample predictions per iteration),
//! `losses.csv` and `accuracies.csv` (one scalar per iteration).

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use ndarray::Array2;

use crate::error::{DataError, Result};

/// Conventional file name for the ground-truth table.
pub const TRUTH_FILE: &str = "true_data.csv";
/// Conventional file name for the prediction snapshots.
pub const PREDICTIONS_FILE: &str = "predictions.csv";
/// Conventional file name for the loss series.
pub const LOSSES_FILE: &str = "losses.csv";
/// Conventional file name for the accuracy series.
pub const ACCURACIES_FILE: &str = "accuracies.csv";

/// Header name of the label column in the ground-truth table.
const LABEL_COLUMN: &str = "y";

/// Resolved locations of the four artifact files.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// Ground-truth table.
    pub truth: PathBuf,
    /// Prediction-snapshot table.
    pub predictions: PathBuf,
    /// Loss series.
    pub losses: PathBuf,
    /// Accuracy series.
    pub accuracies: PathBuf,
}

impl RunPaths {
    /// Paths under a run directory using the conventional file names.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            truth: dir.join(TRUTH_FILE),
            predictions: dir.join(PREDICTIONS_FILE),
            losses: dir.join(LOSSES_FILE),
            accuracies: dir.join(ACCURACIES_FILE),
        }
    }
}

/// Which row of the prediction table to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    /// The final iteration (default).
    Last,
    /// A specific 0-based row index.
    Index(usize),
}

impl Snapshot {
    /// Resolve to a concrete row index for a table of `n_rows` rows.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::SnapshotOutOfRange`] when the index does not
    /// name a row (including `Last` on an empty table).
    pub fn resolve(self, n_rows: usize) -> Result<usize> {
        let index = match self {
            Snapshot::Last => n_rows.checked_sub(1).ok_or(DataError::SnapshotOutOfRange {
                index: 0,
                n_rows,
            })?,
            Snapshot::Index(i) => i,
        };
        if index >= n_rows {
            return Err(DataError::SnapshotOutOfRange { index, n_rows });
        }
        Ok(index)
    }
}

/// The four tables of one training run, loaded into memory.
///
/// Construction reads everything once; the artifacts are immutable
/// afterwards and never written back.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// Ground-truth class label per sample.
    pub truth: Vec<i64>,
    /// Prediction snapshots, shape (n_iterations, n_samples).
    pub predictions: Array2<f64>,
    /// Per-iteration loss.
    pub losses: Vec<f64>,
    /// Per-iteration accuracy.
    pub accuracies: Vec<f64>,
}

impl RunArtifacts {
    /// Load all four tables.
    pub fn load(paths: &RunPaths) -> Result<Self> {
        Ok(Self {
            truth: read_truth(&paths.truth)?,
            predictions: read_predictions(&paths.predictions)?,
            losses: read_series(&paths.losses)?,
            accuracies: read_series(&paths.accuracies)?,
        })
    }

    /// Number of ground-truth samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.truth.len()
    }

    /// Number of prediction snapshots.
    #[must_use]
    pub fn n_iterations(&self) -> usize {
        self.predictions.nrows()
    }

    /// Extract one prediction snapshot as an owned vector.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::SnapshotOutOfRange`] for an index past the
    /// table.
    pub fn snapshot(&self, which: Snapshot) -> Result<Vec<f64>> {
        let row = which.resolve(self.predictions.nrows())?;
        Ok(self.predictions.row(row).to_vec())
    }
}

/// Read the ground-truth labels from `true_data.csv`.
///
/// The label column is located by the header name `y`; when no header
/// matches, the last column is used. Fractional cells are rounded to the
/// nearest integer label.
pub fn read_truth<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    truth_from_reader(file, path)
}

/// Read the full prediction-snapshot table from `predictions.csv`.
///
/// Every row must have the same width (one value per sample).
pub fn read_predictions<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    predictions_from_reader(file, path)
}

/// Read a single-column scalar series (losses or accuracies).
///
/// Only the first cell of each row is used.
pub fn read_series<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    series_from_reader(file, path)
}

fn parse_cell(path: &Path, row: usize, cell: &str) -> Result<f64> {
    cell.trim().parse::<f64>().map_err(|_| DataError::Parse {
        path: path.to_path_buf(),
        row,
        value: cell.to_string(),
    })
}

fn truth_from_reader<R: Read>(reader: R, path: &Path) -> Result<Vec<i64>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: LABEL_COLUMN.to_string(),
        });
    }
    let col = headers
        .iter()
        .position(|h| h.trim() == LABEL_COLUMN)
        .unwrap_or(headers.len() - 1);

    let mut labels = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let cell = record.get(col).ok_or_else(|| DataError::MissingColumn {
            path: path.to_path_buf(),
            column: LABEL_COLUMN.to_string(),
        })?;
        let value = parse_cell(path, i + 1, cell)?;
        labels.push(value.round() as i64);
    }

    if labels.is_empty() {
        return Err(DataError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    Ok(labels)
}

fn predictions_from_reader<R: Read>(reader: R, path: &Path) -> Result<Array2<f64>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    let mut n_rows = 0usize;
    let mut width = None;

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(DataError::RaggedTable {
                path: path.to_path_buf(),
                row: i + 1,
                got: record.len(),
                expected,
            });
        }
        for cell in record.iter() {
            values.push(parse_cell(path, i + 1, cell)?);
        }
        n_rows += 1;
    }

    let width = width.unwrap_or(0);
    if n_rows == 0 || width == 0 {
        return Err(DataError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    Ok(Array2::from_shape_vec((n_rows, width), values)
        .expect("row-major construction matches counted shape"))
}

fn series_from_reader<R: Read>(reader: R, path: &Path) -> Result<Vec<f64>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut series = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let cell = record.get(0).unwrap_or("");
        series.push(parse_cell(path, i + 1, cell)?);
    }

    if series.is_empty() {
        return Err(DataError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> PathBuf {
        PathBuf::from("test.csv")
    }

    #[test]
    fn test_truth_by_header_name() {
        let csv = "x0,x1,y\n0.1,0.2,0\n0.3,0.4,1\n0.5,0.6,2\n";
        let labels = truth_from_reader(csv.as_bytes(), &p()).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_truth_falls_back_to_last_column() {
        let csv = "a,b\n1.0,0\n2.0,1\n";
        let labels = truth_from_reader(csv.as_bytes(), &p()).unwrap();
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_truth_rounds_float_labels() {
        let csv = "y\n0.0\n1.0\n2.0\n";
        let labels = truth_from_reader(csv.as_bytes(), &p()).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_truth_empty_table() {
        let csv = "y\n";
        let err = truth_from_reader(csv.as_bytes(), &p()).unwrap_err();
        assert!(matches!(err, DataError::EmptyTable { .. }));
    }

    #[test]
    fn test_truth_parse_error_reports_row() {
        let csv = "y\n0\nspiral\n";
        let err = truth_from_reader(csv.as_bytes(), &p()).unwrap_err();
        match err {
            DataError::Parse { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "spiral");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_predictions_shape() {
        let csv = "a,b,c\n0.1,0.2,0.3\n0.4,0.5,0.6\n";
        let preds = predictions_from_reader(csv.as_bytes(), &p()).unwrap();
        assert_eq!(preds.dim(), (2, 3));
        assert!((preds[[1, 2]] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_predictions_ragged_row() {
        let csv = "a,b\n0.1,0.2\n0.3\n";
        let err = predictions_from_reader(csv.as_bytes(), &p()).unwrap_err();
        match err {
            DataError::RaggedTable { row, got, expected, .. } => {
                assert_eq!(row, 2);
                assert_eq!(got, 1);
                assert_eq!(expected, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_series_single_column() {
        let csv = "loss\n2.5\n1.5\n0.5\n";
        let series = series_from_reader(csv.as_bytes(), &p()).unwrap();
        assert_eq!(series, vec![2.5, 1.5, 0.5]);
    }

    #[test]
    fn test_snapshot_last_and_index() {
        assert_eq!(Snapshot::Last.resolve(3).unwrap(), 2);
        assert_eq!(Snapshot::Index(0).resolve(3).unwrap(), 0);
        assert!(Snapshot::Index(3).resolve(3).is_err());
        assert!(Snapshot::Last.resolve(0).is_err());
    }

    #[test]
    fn test_artifacts_snapshot_row() {
        let predictions =
            Array2::from_shape_vec((2, 3), vec![0.0, 0.0, 0.0, 0.1, 0.9, 0.2]).unwrap();
        let artifacts = RunArtifacts {
            truth: vec![0, 1, 0],
            predictions,
            losses: vec![1.0, 0.5],
            accuracies: vec![0.3, 0.9],
        };

        let snap = artifacts.snapshot(Snapshot::Last).unwrap();
        assert_eq!(snap, vec![0.1, 0.9, 0.2]);
        assert_eq!(artifacts.n_samples(), 3);
        assert_eq!(artifacts.n_iterations(), 2);
    }

    #[test]
    fn test_run_paths_from_dir() {
        let paths = RunPaths::from_dir("runs/spiral");
        assert!(paths.truth.ends_with("true_data.csv"));
        assert!(paths.predictions.ends_with("predictions.csv"));
        assert!(paths.losses.ends_with("losses.csv"));
        assert!(paths.accuracies.ends_with("accuracies.csv"));
    }
}
