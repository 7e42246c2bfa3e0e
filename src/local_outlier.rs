//! Distance-based local outlier scoring over a fixed feature matrix
//!
//! For each row, the score is the mean reachability-style distance to its k
//! nearest neighbors: each neighbor distance is floored by the k-th neighbor
//! distance, so near-duplicate points cannot drag a score to zero. Higher
//! score = more isolated = more anomalous.
//!
//! Distances are the full O(n²) pairwise Euclidean sweep with no spatial
//! index; a deliberate simplicity trade-off that limits scaling to datasets
//! in the low tens of thousands of rows.

use thiserror::Error;

/// Default neighbor count
pub const DEFAULT_NEIGHBORS: usize = 5;

/// Errors for local outlier scoring
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("no samples provided")]
    EmptyInput,

    #[error("need at least 2 samples to compute neighbor distances, got 1")]
    NoNeighbors,

    #[error("neighbor count k must be at least 1")]
    ZeroNeighbors,

    #[error("row {row} has {actual} features, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, ScoreError>;

/// Euclidean distance between two equal-length feature rows.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Score every row of the feature matrix.
///
/// For row `i`: sort distances to all other rows ascending, take the k
/// smallest, and average `max(distance, k-distance)` over them. When fewer
/// than `k` neighbors exist (`n <= k`), all available neighbors are used.
pub fn local_outlier_scores(rows: &[Vec<f64>], k: usize) -> Result<Vec<f64>> {
    if k == 0 {
        return Err(ScoreError::ZeroNeighbors);
    }
    match rows.len() {
        0 => return Err(ScoreError::EmptyInput),
        1 => return Err(ScoreError::NoNeighbors),
        _ => {}
    }
    let width = rows[0].len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ScoreError::RaggedRows {
                row: i,
                expected: width,
                actual: row.len(),
            });
        }
    }

    let mut scores = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut distances: Vec<f64> = rows
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, other)| euclidean_distance(row, other))
            .collect();
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let k_eff = k.min(distances.len());
        let k_distance = distances[k_eff - 1];
        let score = distances[..k_eff]
            .iter()
            .map(|d| d.max(k_distance))
            .sum::<f64>()
            / k_eff as f64;
        scores.push(score);
    }
    Ok(scores)
}
