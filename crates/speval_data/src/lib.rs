//! # speval_data
//!
//! Loading of the CSV artifacts an external spiral-classification training
//! run leaves behind: ground-truth labels, per-iteration prediction
//! snapshots, and the loss/accuracy series.
//!
//! All tables are read once into [`RunArtifacts`]; nothing is written back.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod tables;

pub use error::{DataError, Result};
pub use tables::{
    read_predictions, read_series, read_truth, RunArtifacts, RunPaths, Snapshot, ACCURACIES_FILE,
    LOSSES_FILE, PREDICTIONS_FILE, TRUTH_FILE,
};
