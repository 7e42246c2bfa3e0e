//! Weighted multi-feature z-score anomaly scoring
//!
//! A cheap baseline scorer: per feature column, compute mean and standard
//! deviation (Trueno SIMD-accelerated), then score each sample as the
//! weighted sum of absolute z-scores across columns. Columns are expected to
//! be min-max normalized first so no single feature dominates. Higher score
//! = more anomalous.

use thiserror::Error;
use trueno::Vector;

/// Guard against division by zero on constant columns
const STDDEV_EPSILON: f64 = 1e-10;

/// Errors for z-score scoring
#[derive(Error, Debug)]
pub enum ZScoreError {
    #[error("no feature columns provided")]
    NoColumns,

    #[error("column {column} has {actual} values, expected {expected}")]
    RaggedColumns {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error("got {weights} weights for {columns} columns")]
    WeightCountMismatch { weights: usize, columns: usize },
}

pub type Result<T> = std::result::Result<T, ZScoreError>;

/// Score every sample from its per-column absolute z-scores.
///
/// `columns` holds one vector per feature, all the same length (one entry
/// per sample). `weights` must match the column count; `None` weights each
/// column uniformly at `1 / n_columns`.
pub fn weighted_zscore_scores(
    columns: &[Vec<f64>],
    weights: Option<&[f64]>,
) -> Result<Vec<f64>> {
    if columns.is_empty() {
        return Err(ZScoreError::NoColumns);
    }
    let n_samples = columns[0].len();
    for (i, column) in columns.iter().enumerate() {
        if column.len() != n_samples {
            return Err(ZScoreError::RaggedColumns {
                column: i,
                expected: n_samples,
                actual: column.len(),
            });
        }
    }

    let uniform = vec![1.0 / columns.len() as f64; columns.len()];
    let weights = match weights {
        Some(w) if w.len() != columns.len() => {
            return Err(ZScoreError::WeightCountMismatch {
                weights: w.len(),
                columns: columns.len(),
            });
        }
        Some(w) => w,
        None => uniform.as_slice(),
    };

    // Per-column baselines
    let baselines: Vec<(f64, f64)> = columns
        .iter()
        .map(|column| {
            let column32: Vec<f32> = column.iter().map(|&v| v as f32).collect();
            let v = Vector::from_slice(&column32);
            let mean = v.mean().unwrap_or(0.0) as f64;
            let stddev = v.stddev().unwrap_or(0.0) as f64;
            (mean, stddev)
        })
        .collect();

    let mut scores = vec![0.0; n_samples];
    for ((column, &(mean, stddev)), &weight) in
        columns.iter().zip(baselines.iter()).zip(weights.iter())
    {
        for (score, &value) in scores.iter_mut().zip(column.iter()) {
            let z = (value - mean).abs() / (stddev + STDDEV_EPSILON);
            *score += weight * z;
        }
    }
    Ok(scores)
}
