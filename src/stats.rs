//! Score distribution analysis for labeled datasets
//!
//! Per-class score statistics (Trueno SIMD-accelerated means) plus a
//! separation quality readout, so a driver can see at a glance whether a
//! scorer pulls anomalies away from normal samples before committing to a
//! threshold.

use serde::Serialize;
use trueno::Vector;

/// Min/max/mean over one class of scores
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassScoreStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl ClassScoreStats {
    fn from_scores(scores: &[f32]) -> Self {
        if scores.is_empty() {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        let v = Vector::from_slice(scores);
        Self {
            count: scores.len(),
            min: scores.iter().copied().fold(f32::INFINITY, f32::min),
            max: scores.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            mean: v.mean().unwrap_or(0.0),
        }
    }
}

/// Score distribution across all samples and per label class
#[derive(Debug, Clone, Serialize)]
pub struct ScoreAnalysis {
    pub overall: ClassScoreStats,
    pub anomalous: ClassScoreStats,
    pub normal: ClassScoreStats,
    /// (anomaly mean - normal mean) / overall score range
    pub separation: f32,
}

impl ScoreAnalysis {
    /// Compute the analysis; `None` when scores are empty or the lengths
    /// disagree (display-level helper, not a validation gate).
    pub fn compute(scores: &[f64], labels: &[bool]) -> Option<Self> {
        if scores.is_empty() || scores.len() != labels.len() {
            return None;
        }

        let all: Vec<f32> = scores.iter().map(|&s| s as f32).collect();
        let anomalous: Vec<f32> = scores
            .iter()
            .zip(labels.iter())
            .filter(|(_, &l)| l)
            .map(|(&s, _)| s as f32)
            .collect();
        let normal: Vec<f32> = scores
            .iter()
            .zip(labels.iter())
            .filter(|(_, &l)| !l)
            .map(|(&s, _)| s as f32)
            .collect();

        let overall = ClassScoreStats::from_scores(&all);
        let anomalous = ClassScoreStats::from_scores(&anomalous);
        let normal = ClassScoreStats::from_scores(&normal);

        let range = overall.max - overall.min;
        let separation = if range > 0.0 && anomalous.count > 0 && normal.count > 0 {
            (anomalous.mean - normal.mean) / range
        } else {
            0.0
        };

        Some(Self {
            overall,
            anomalous,
            normal,
            separation,
        })
    }

    fn assessment(&self) -> &'static str {
        if self.separation > 0.3 {
            "good separation"
        } else if self.separation > 0.1 {
            "weak separation"
        } else if self.separation > 0.0 {
            "poor separation"
        } else {
            "no separation (check score polarity)"
        }
    }

    /// Render the formatted analysis banner.
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str("\n=== Score Distribution Analysis ===\n");
        output.push_str(&format!(
            "Total samples: {} ({} anomalous, {} normal)\n",
            self.overall.count, self.anomalous.count, self.normal.count
        ));
        output.push_str(&format!(
            "All scores:     min {:.4}, max {:.4}, mean {:.4}\n",
            self.overall.min, self.overall.max, self.overall.mean
        ));
        if self.anomalous.count > 0 {
            output.push_str(&format!(
                "Anomaly scores: min {:.4}, max {:.4}, mean {:.4}\n",
                self.anomalous.min, self.anomalous.max, self.anomalous.mean
            ));
        }
        if self.normal.count > 0 {
            output.push_str(&format!(
                "Normal scores:  min {:.4}, max {:.4}, mean {:.4}\n",
                self.normal.min, self.normal.max, self.normal.mean
            ));
        }
        output.push_str(&format!(
            "Separation: {:.4} ({})\n",
            self.separation,
            self.assessment()
        ));

        output
    }
}
