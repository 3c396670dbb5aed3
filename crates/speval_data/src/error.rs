//! Error types for speval_data.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading run artifacts.
#[derive(Error, Debug)]
pub enum DataError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/parse error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be parsed as a number.
    #[error("{path}: row {row}: cannot parse {value:?} as a number")]
    Parse {
        /// File the cell came from.
        path: PathBuf,
        /// 1-based data row (header excluded).
        row: usize,
        /// The offending cell content.
        value: String,
    },

    /// The label column was not found.
    #[error("{path}: no {column:?} column and no columns to fall back to")]
    MissingColumn {
        /// File that was searched.
        path: PathBuf,
        /// The column name that was looked for.
        column: String,
    },

    /// A table contained a header but no data rows.
    #[error("{path}: table has no data rows")]
    EmptyTable {
        /// The empty file.
        path: PathBuf,
    },

    /// Rows of the prediction table have different widths.
    #[error("{path}: row {row} has {got} values, expected {expected}")]
    RaggedTable {
        /// The offending file.
        path: PathBuf,
        /// 1-based data row.
        row: usize,
        /// Observed width.
        got: usize,
        /// Width of the first row.
        expected: usize,
    },

    /// A snapshot index past the end of the prediction table.
    #[error("snapshot index {index} out of range for {n_rows} prediction rows")]
    SnapshotOutOfRange {
        /// The requested row index.
        index: usize,
        /// Number of rows in the table.
        n_rows: usize,
    },
}
