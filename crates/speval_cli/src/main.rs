//! spiral-eval CLI for inspecting the artifacts of a training run.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use speval_analysis::{
    classification_report, confusion_heatmap, evaluate, resolve_labels, CurveChart,
    PredictionKind, SeriesSummary, DEFAULT_THRESHOLD,
};
use speval_data::{read_series, RunArtifacts, RunPaths, Snapshot};

#[derive(Parser)]
#[command(name = "speval")]
#[command(author, version)]
#[command(about = "Evaluate spiral-classification training runs from their CSV artifacts")]
#[command(long_about = "speval: metrics and charts for spiral-classification training runs.

A run directory holds four CSV files written by the training process:
true_data.csv, predictions.csv, losses.csv, accuracies.csv.

EXAMPLES:
  # Accuracy, per-class accuracy, and confusion heatmap for the final snapshot
  speval evaluate --run-dir ./data

  # Same, but treating predictions as discrete labels instead of probabilities
  speval evaluate --run-dir ./data --labels

  # Evaluate an earlier snapshot with a custom threshold
  speval evaluate --run-dir ./data --snapshot 100 --threshold 0.4

  # Per-class precision/recall/F1 table
  speval report --run-dir ./data

  # Loss and accuracy curves
  speval curves --run-dir ./data")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one prediction snapshot against the ground truth
    Evaluate {
        /// Directory holding the artifact CSVs
        #[arg(long, default_value = "./data", value_name = "DIR")]
        run_dir: PathBuf,

        /// Override the ground-truth table path
        #[arg(long, value_name = "FILE")]
        truth: Option<PathBuf>,

        /// Override the prediction table path
        #[arg(long, value_name = "FILE")]
        predictions: Option<PathBuf>,

        /// Prediction row to evaluate: "last" or a 0-based index
        #[arg(long, default_value = "last", value_name = "ROW")]
        snapshot: String,

        /// Binarization threshold for probability predictions
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_name = "T")]
        threshold: f64,

        /// Treat predictions as discrete class labels, not probabilities
        #[arg(long, default_value = "false")]
        labels: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text", value_name = "FORMAT")]
        format: String,
    },
    /// Print the per-class precision/recall/F1 report
    Report {
        /// Directory holding the artifact CSVs
        #[arg(long, default_value = "./data", value_name = "DIR")]
        run_dir: PathBuf,

        /// Override the ground-truth table path
        #[arg(long, value_name = "FILE")]
        truth: Option<PathBuf>,

        /// Override the prediction table path
        #[arg(long, value_name = "FILE")]
        predictions: Option<PathBuf>,

        /// Prediction row to evaluate: "last" or a 0-based index
        #[arg(long, default_value = "last", value_name = "ROW")]
        snapshot: String,

        /// Binarization threshold for probability predictions
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_name = "T")]
        threshold: f64,

        /// Treat predictions as discrete class labels, not probabilities
        #[arg(long, default_value = "false")]
        labels: bool,
    },
    /// Render the loss/accuracy curves of a run
    Curves {
        /// Directory holding the artifact CSVs
        #[arg(long, default_value = "./data", value_name = "DIR")]
        run_dir: PathBuf,

        /// Override the loss-series path
        #[arg(long, value_name = "FILE")]
        losses: Option<PathBuf>,

        /// Override the accuracy-series path
        #[arg(long, value_name = "FILE")]
        accuracies: Option<PathBuf>,

        /// Which curves to render: loss, accuracy, both
        #[arg(long, default_value = "both", value_name = "METRIC")]
        metric: String,

        /// Chart width in columns
        #[arg(long, default_value = "60", value_name = "COLS")]
        width: usize,

        /// Chart height in rows
        #[arg(long, default_value = "15", value_name = "ROWS")]
        height: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Evaluate {
            run_dir,
            truth,
            predictions,
            snapshot,
            threshold,
            labels,
            format,
        } => handle_evaluate(run_dir, truth, predictions, snapshot, threshold, labels, format),
        Commands::Report {
            run_dir,
            truth,
            predictions,
            snapshot,
            threshold,
            labels,
        } => handle_report(run_dir, truth, predictions, snapshot, threshold, labels),
        Commands::Curves {
            run_dir,
            losses,
            accuracies,
            metric,
            width,
            height,
        } => handle_curves(run_dir, losses, accuracies, metric, width, height),
    }
}

/// Parse a snapshot selector: "last" or a 0-based row index.
fn parse_snapshot(selector: &str) -> Result<Snapshot> {
    if selector.eq_ignore_ascii_case("last") {
        return Ok(Snapshot::Last);
    }
    match selector.parse::<usize>() {
        Ok(index) => Ok(Snapshot::Index(index)),
        Err(_) => bail!("invalid snapshot selector '{selector}': expected \"last\" or an index"),
    }
}

fn prediction_kind(labels: bool, threshold: f64) -> PredictionKind {
    if labels {
        PredictionKind::Label
    } else {
        PredictionKind::Probability { threshold }
    }
}

/// Load the four run tables and extract the selected prediction snapshot.
///
/// The loss and accuracy series are loaded alongside the evaluated tables
/// the way the training process left them; the evaluator itself does not
/// consume them.
fn load_snapshot(
    run_dir: PathBuf,
    truth_override: Option<PathBuf>,
    predictions_override: Option<PathBuf>,
    selector: &str,
) -> Result<(RunArtifacts, Vec<f64>, usize)> {
    let mut paths = RunPaths::from_dir(&run_dir);
    if let Some(p) = truth_override {
        paths.truth = p;
    }
    if let Some(p) = predictions_override {
        paths.predictions = p;
    }

    tracing::debug!(truth = %paths.truth.display(), predictions = %paths.predictions.display(), "loading run artifacts");

    let artifacts = RunArtifacts::load(&paths)
        .with_context(|| format!("failed to load run artifacts from {:?}", run_dir))?;

    let which = parse_snapshot(selector)?;
    let row = which.resolve(artifacts.n_iterations())?;
    let snapshot = artifacts.snapshot(which).context("snapshot selection failed")?;

    Ok((artifacts, snapshot, row))
}

fn handle_evaluate(
    run_dir: PathBuf,
    truth_override: Option<PathBuf>,
    predictions_override: Option<PathBuf>,
    snapshot: String,
    threshold: f64,
    labels: bool,
    format: String,
) -> Result<()> {
    let (artifacts, values, row) =
        load_snapshot(run_dir, truth_override, predictions_override, &snapshot)?;
    let kind = prediction_kind(labels, threshold);

    let evaluation = evaluate(&artifacts.truth, &values, kind).context("evaluation failed")?;

    match format.to_lowercase().as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        "text" => {
            println!("=== speval Evaluation ===\n");
            println!("Snapshot row: {row}");
            println!("Samples: {}", evaluation.n_samples);
            match kind {
                PredictionKind::Probability { threshold } => {
                    println!("Predictions: probabilities (threshold {threshold})")
                }
                PredictionKind::Label => println!("Predictions: discrete labels"),
            }
            println!();
            println!("Accuracy: {:.2}%", evaluation.accuracy * 100.0);
            println!();
            for entry in &evaluation.per_class {
                println!(
                    "Accuracy for class {}: {:.4}  ({} samples)",
                    entry.class, entry.accuracy, entry.support
                );
            }
            println!();
            println!("Confusion matrix (rows = true, cols = predicted):");
            println!("{}", confusion_heatmap(&evaluation.confusion));
        }
        _ => {
            bail!("unknown output format '{format}'. Supported: text, json");
        }
    }

    Ok(())
}

fn handle_report(
    run_dir: PathBuf,
    truth_override: Option<PathBuf>,
    predictions_override: Option<PathBuf>,
    snapshot: String,
    threshold: f64,
    labels: bool,
) -> Result<()> {
    let (artifacts, values, row) =
        load_snapshot(run_dir, truth_override, predictions_override, &snapshot)?;
    let kind = prediction_kind(labels, threshold);

    let predicted = resolve_labels(&values, kind);
    let report = classification_report(&artifacts.truth, &predicted).context("report failed")?;

    println!("=== speval Classification Report ===\n");
    println!("Snapshot row: {row}\n");
    println!("{}", report.to_string_table());

    if let (Some(best), Some(worst)) = (report.best_class(), report.worst_class()) {
        println!(
            "Best class: {} (F1 {:.2})   Worst class: {} (F1 {:.2})",
            best.class, best.f1_score, worst.class, worst.f1_score
        );
    }

    Ok(())
}

fn handle_curves(
    run_dir: PathBuf,
    losses_override: Option<PathBuf>,
    accuracies_override: Option<PathBuf>,
    metric: String,
    width: usize,
    height: usize,
) -> Result<()> {
    let mut paths = RunPaths::from_dir(&run_dir);
    if let Some(p) = losses_override {
        paths.losses = p;
    }
    if let Some(p) = accuracies_override {
        paths.accuracies = p;
    }

    let chart = CurveChart { width, height };
    let (show_loss, show_accuracy) = match metric.to_lowercase().as_str() {
        "loss" => (true, false),
        "accuracy" => (false, true),
        "both" => (true, true),
        _ => bail!("unknown metric '{metric}'. Supported: loss, accuracy, both"),
    };

    println!("=== speval Curves ===\n");

    if show_loss {
        let losses = read_series(&paths.losses)
            .with_context(|| format!("failed to load losses from {:?}", paths.losses))?;
        println!("{}", chart.render(&losses, "Loss"));
        print_summary("Loss", SeriesSummary::from_series(&losses));
        println!();
    }

    if show_accuracy {
        let accuracies = read_series(&paths.accuracies)
            .with_context(|| format!("failed to load accuracies from {:?}", paths.accuracies))?;
        println!("{}", chart.render(&accuracies, "Accuracy"));
        print_summary("Accuracy", SeriesSummary::from_series(&accuracies));
    }

    Ok(())
}

fn print_summary(label: &str, summary: Option<SeriesSummary>) {
    if let Some(s) = summary {
        println!(
            "{label}: first {:.4}  final {:.4}  min {:.4}  max {:.4}",
            s.first, s.last, s.min, s.max
        );
    }
}
