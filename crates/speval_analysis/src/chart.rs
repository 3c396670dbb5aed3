//! Terminal chart rendering.
//!
//! Charts are rendered to strings for console display only; nothing is
//! written to disk. Color output degrades to plain aligned text when the
//! terminal does not support it (NO_COLOR is respected by the color
//! handling crate).

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::confusion::ConfusionMatrix;

/// Blue ramp endpoints for the heatmap background (light to dark).
const RAMP_LIGHT: (u8, u8, u8) = (247, 251, 255);
const RAMP_DARK: (u8, u8, u8) = (8, 48, 107);

fn ramp(v: f64) -> (u8, u8, u8) {
    let v = v.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * v).round() as u8;
    (
        lerp(RAMP_LIGHT.0, RAMP_DARK.0),
        lerp(RAMP_LIGHT.1, RAMP_DARK.1),
        lerp(RAMP_LIGHT.2, RAMP_DARK.2),
    )
}

/// Render a confusion matrix as a colored heatmap.
///
/// Cell backgrounds scale with the row-normalized count, so each row
/// reads as the recall profile of its true class. Cells are annotated
/// with the raw counts.
pub fn confusion_heatmap(cm: &ConfusionMatrix) -> String {
    let norm = cm.normalize();
    let mut out = String::new();

    // Column header (predicted labels)
    out.push_str("           ");
    for label in &cm.labels {
        out.push_str(&format!("{:>8}", format!("pred {label}")));
    }
    out.push('\n');

    for (i, label) in cm.labels.iter().enumerate() {
        out.push_str(&format!("{:>10} ", format!("true {label}")));
        for j in 0..cm.n_classes() {
            let v = norm[i][j];
            let (r, g, b) = ramp(v);
            let cell = format!("{:>7} ", cm.matrix[i][j]);
            let cell = if v > 0.5 {
                cell.truecolor(255, 255, 255).on_truecolor(r, g, b)
            } else {
                cell.truecolor(0, 0, 0).on_truecolor(r, g, b)
            };
            out.push_str(&cell.to_string());
        }
        out.push('\n');
    }

    out
}

/// A fixed-size character-grid chart for a scalar series over iterations.
#[derive(Debug, Clone, Copy)]
pub struct CurveChart {
    /// Number of plot columns.
    pub width: usize,
    /// Number of plot rows.
    pub height: usize,
}

impl Default for CurveChart {
    fn default() -> Self {
        Self {
            width: 60,
            height: 15,
        }
    }
}

impl CurveChart {
    /// Render the series as a character grid with y-axis extremes labeled.
    ///
    /// Long series are downsampled column-wise (bucket means); series
    /// shorter than the chart width use one column per point.
    pub fn render(&self, series: &[f64], label: &str) -> String {
        if series.is_empty() {
            return format!("{label}: (no data)\n");
        }

        let n = series.len();
        let cols = self.width.min(n).max(1);
        let rows = self.height.max(2);

        // Bucket means, one per column.
        let mut points = Vec::with_capacity(cols);
        for col in 0..cols {
            let start = col * n / cols;
            let end = (((col + 1) * n) / cols).max(start + 1);
            let bucket = &series[start..end];
            points.push(bucket.iter().sum::<f64>() / bucket.len() as f64);
        }

        let min = points.iter().copied().fold(f64::INFINITY, f64::min);
        let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let mut grid = vec![vec![' '; cols]; rows];
        for (col, &v) in points.iter().enumerate() {
            let frac = if span > 0.0 { (v - min) / span } else { 0.5 };
            let row = rows - 1 - (frac * (rows - 1) as f64).round() as usize;
            grid[row][col] = '•';
        }

        let mut out = String::new();
        out.push_str(&format!("{label} over {n} iterations\n"));
        for (i, row) in grid.iter().enumerate() {
            let margin = if i == 0 {
                format!("{max:>10.4} ┤")
            } else if i == rows - 1 {
                format!("{min:>10.4} ┤")
            } else {
                format!("{:>10} │", "")
            };
            out.push_str(&margin);
            out.push_str(&row.iter().collect::<String>());
            out.push('\n');
        }
        out.push_str(&format!("{:>10} └{}\n", "", "─".repeat(cols)));
        if n > 1 {
            out.push_str(&format!(
                "{:>12}0{:>width$}\n",
                "",
                n - 1,
                width = cols.saturating_sub(1)
            ));
        } else {
            out.push_str(&format!("{:>12}0\n", ""));
        }

        out
    }
}

/// First/last/min/max digest of a scalar series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of values.
    pub n: usize,
    /// First value.
    pub first: f64,
    /// Final value.
    pub last: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl SeriesSummary {
    /// Summarise a series; `None` when it is empty.
    #[must_use]
    pub fn from_series(series: &[f64]) -> Option<Self> {
        let first = *series.first()?;
        let last = *series.last()?;
        let min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            n: series.len(),
            first,
            last,
            min,
            max,
        })
    }
}
