//! Decision threshold calibration
//!
//! Sweeps a uniform grid of thresholds over held-out probabilities and keeps
//! the one with the best F1. The full per-threshold table is retained for
//! auditing.

use crate::evaluation::ConfusionMatrix;
use serde::{Deserialize, Serialize};
use staysense_core::{Error, Result};
use tracing::info;

/// Uniform, inclusive grid of candidate thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    #[serde(default = "default_start")]
    pub start: f32,

    #[serde(default = "default_end")]
    pub end: f32,

    #[serde(default = "default_steps")]
    pub steps: usize,
}

impl Default for ThresholdGrid {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            steps: default_steps(),
        }
    }
}

fn default_start() -> f32 {
    0.1
}

fn default_end() -> f32 {
    0.9
}

fn default_steps() -> usize {
    81
}

impl ThresholdGrid {
    pub fn new(start: f32, end: f32, steps: usize) -> Self {
        Self { start, end, steps }
    }

    /// Candidate thresholds in ascending order
    pub fn points(&self) -> Result<Vec<f32>> {
        if self.steps == 0 {
            return Err(Error::calibration("threshold grid needs at least one step"));
        }
        let in_open_unit = |t: f32| t > 0.0 && t < 1.0;
        if !in_open_unit(self.start) || !in_open_unit(self.end) || self.start > self.end {
            return Err(Error::calibration(format!(
                "threshold grid [{}, {}] must lie inside (0, 1) in ascending order",
                self.start, self.end
            )));
        }
        if self.steps == 1 {
            return Ok(vec![self.start]);
        }

        let start = f64::from(self.start);
        let step = (f64::from(self.end) - start) / (self.steps - 1) as f64;
        Ok((0..self.steps)
            .map(|i| (start + step * i as f64) as f32)
            .collect())
    }
}

/// Precision, recall and F1 at one threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMetrics {
    pub threshold: f32,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

/// Winning threshold and the table it was chosen from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub threshold: f32,
    pub f1: f32,
    pub precision: f32,
    pub recall: f32,
    pub table: Vec<ThresholdMetrics>,
}

impl CalibrationResult {
    /// Wrap a fixed threshold with no sweep behind it
    pub fn fixed(threshold: f32) -> Self {
        Self {
            threshold,
            f1: 0.0,
            precision: 0.0,
            recall: 0.0,
            table: Vec::new(),
        }
    }
}

/// Select the threshold with maximum F1 on a labeled validation split.
///
/// A probability strictly greater than the threshold predicts the positive
/// class. On equal F1 the smaller threshold wins.
pub fn calibrate(
    probabilities: &[f32],
    labels: &[u8],
    grid: &ThresholdGrid,
) -> Result<CalibrationResult> {
    if probabilities.is_empty() {
        return Err(Error::calibration("no validation probabilities"));
    }
    if probabilities.len() != labels.len() {
        return Err(Error::calibration(format!(
            "{} probabilities but {} labels",
            probabilities.len(),
            labels.len()
        )));
    }
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(Error::calibration(format!("label {bad} is not 0 or 1")));
    }

    let mut table = Vec::with_capacity(grid.steps);
    let mut best: Option<ThresholdMetrics> = None;

    for threshold in grid.points()? {
        let predictions: Vec<u8> = probabilities
            .iter()
            .map(|&p| u8::from(p > threshold))
            .collect();
        let matrix = ConfusionMatrix::from_predictions(labels, &predictions);
        let row = ThresholdMetrics {
            threshold,
            precision: matrix.precision(),
            recall: matrix.recall(),
            f1: matrix.f1(),
        };

        if best.map_or(true, |b| row.f1 > b.f1) {
            best = Some(row);
        }
        table.push(row);
    }

    let best = best.ok_or_else(|| Error::calibration("empty threshold grid"))?;
    info!(
        "Calibrated threshold {:.3} (f1 {:.4}, precision {:.4}, recall {:.4})",
        best.threshold, best.f1, best.precision, best.recall
    );

    Ok(CalibrationResult {
        threshold: best.threshold,
        f1: best.f1,
        precision: best.precision,
        recall: best.recall,
        table,
    })
}
