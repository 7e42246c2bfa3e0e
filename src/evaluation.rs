//! Evaluation of anomaly scores against ground-truth labels
//!
//! Turns a score vector and a boolean label vector into a confusion matrix,
//! derived metrics, a tie-aware ROC curve, and AUC via trapezoidal
//! integration. [`evaluate`] is the top-level entry point every driver
//! calls; higher score = more likely positive throughout.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors for evaluation inputs
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("scores and labels must be the same length ({scores} scores, {labels} labels)")]
    LengthMismatch { scores: usize, labels: usize },

    #[error("scores and labels must be non-empty")]
    EmptyInput,

    #[error("labels must contain at least one positive and one negative sample")]
    SingleClassLabels,
}

pub type Result<T> = std::result::Result<T, EvalError>;

/// Binary classification tallies at a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Metrics derived from a confusion matrix
///
/// Every zero-denominator case yields 0.0 by definition (not an error); this
/// fixes the behavior on degenerate all-one-class predictions.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub f1_score: f64,
}

/// One point of the ROC curve
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RocPoint {
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

/// Ordered ROC curve from (+inf, 0, 0) down to (min score, 1, 1)
#[derive(Debug, Clone, Serialize)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
}

impl RocCurve {
    /// Area under the curve via the trapezoidal rule over the FPR axis.
    pub fn auc(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
            .sum()
    }
}

/// Full evaluation result: the structured report every driver consumes
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub confusion: ConfusionMatrix,
    pub metrics: Metrics,
    pub threshold: f64,
    pub auc: f64,
    pub roc: RocCurve,
}

fn validate(scores: &[f64], labels: &[bool]) -> Result<()> {
    if scores.len() != labels.len() {
        return Err(EvalError::LengthMismatch {
            scores: scores.len(),
            labels: labels.len(),
        });
    }
    if scores.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    Ok(())
}

/// Tally the confusion matrix at the given threshold.
///
/// A sample is classified positive iff `score > threshold` (strict: a score
/// exactly at the threshold classifies negative).
pub fn confusion_matrix(
    scores: &[f64],
    labels: &[bool],
    threshold: f64,
) -> Result<ConfusionMatrix> {
    validate(scores, labels)?;

    let mut cm = ConfusionMatrix {
        true_positives: 0,
        false_positives: 0,
        true_negatives: 0,
        false_negatives: 0,
    };
    for (&score, &is_positive) in scores.iter().zip(labels.iter()) {
        let predicted_positive = score > threshold;
        match (is_positive, predicted_positive) {
            (true, true) => cm.true_positives += 1,
            (false, true) => cm.false_positives += 1,
            (false, false) => cm.true_negatives += 1,
            (true, false) => cm.false_negatives += 1,
        }
    }
    Ok(cm)
}

/// Derive accuracy, precision, recall, specificity, and F1.
pub fn derive_metrics(cm: &ConfusionMatrix) -> Metrics {
    let tp = cm.true_positives as f64;
    let fp = cm.false_positives as f64;
    let tn = cm.true_negatives as f64;
    let fn_ = cm.false_negatives as f64;

    let total = tp + fp + tn + fn_;
    let accuracy = if total > 0.0 { (tp + tn) / total } else { 0.0 };
    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
    let specificity = if tn + fp > 0.0 { tn / (tn + fp) } else { 0.0 };
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    Metrics {
        accuracy,
        precision,
        recall,
        specificity,
        f1_score,
    }
}

/// Sweep thresholds over every distinct score value, descending.
///
/// All samples tied at one score contribute to the running counts before the
/// next point is emitted, so tied scores cannot produce sawtooth artifacts.
/// The curve is prefixed with (+inf, 0, 0) and suffixed with the minimum
/// score at (1, 1). Requires both classes to be present; ROC is undefined
/// otherwise.
pub fn roc_curve(scores: &[f64], labels: &[bool]) -> Result<RocCurve> {
    validate(scores, labels)?;

    let total_positives = labels.iter().filter(|&&l| l).count() as f64;
    let total_negatives = labels.len() as f64 - total_positives;
    if total_positives == 0.0 || total_negatives == 0.0 {
        return Err(EvalError::SingleClassLabels);
    }

    let mut pairs: Vec<(f64, bool)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];

    let mut true_positives = 0.0;
    let mut false_positives = 0.0;
    let mut prev_score: Option<f64> = None;

    for &(score, label) in &pairs {
        if let Some(prev) = prev_score {
            if score != prev {
                points.push(RocPoint {
                    threshold: prev,
                    fpr: false_positives / total_negatives,
                    tpr: true_positives / total_positives,
                });
            }
        }
        prev_score = Some(score);

        if label {
            true_positives += 1.0;
        } else {
            false_positives += 1.0;
        }
    }

    // Final point: everything classified positive.
    points.push(RocPoint {
        threshold: pairs[pairs.len() - 1].0,
        fpr: false_positives / total_negatives,
        tpr: true_positives / total_positives,
    });

    Ok(RocCurve { points })
}

/// Midpoint between the mean score of positives and the mean score of
/// negatives. A simple heuristic, not a calibrated decision boundary.
pub fn class_mean_threshold(scores: &[f64], labels: &[bool]) -> f64 {
    let mut positive_sum = 0.0;
    let mut negative_sum = 0.0;
    let mut positive_count = 0usize;
    let mut negative_count = 0usize;

    for (&score, &label) in scores.iter().zip(labels.iter()) {
        if label {
            positive_sum += score;
            positive_count += 1;
        } else {
            negative_sum += score;
            negative_count += 1;
        }
    }

    let positive_mean = if positive_count > 0 {
        positive_sum / positive_count as f64
    } else {
        0.0
    };
    let negative_mean = if negative_count > 0 {
        negative_sum / negative_count as f64
    } else {
        0.0
    };
    (positive_mean + negative_mean) / 2.0
}

/// Threshold at the given score percentile (0-100), the alternative some
/// callers prefer over the class-mean midpoint.
pub fn percentile_threshold(scores: &[f64], percentile: f64) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((sorted.len() as f64 * percentile / 100.0) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Evaluate scores against labels: confusion matrix, metrics, ROC, and AUC.
///
/// With no explicit threshold, the class-mean midpoint is used. Both label
/// classes must be present.
pub fn evaluate(
    scores: &[f64],
    labels: &[bool],
    threshold: Option<f64>,
) -> Result<EvaluationReport> {
    validate(scores, labels)?;
    if labels.iter().all(|&l| l) || labels.iter().all(|&l| !l) {
        return Err(EvalError::SingleClassLabels);
    }

    let threshold = threshold.unwrap_or_else(|| class_mean_threshold(scores, labels));
    let confusion = confusion_matrix(scores, labels, threshold)?;
    let metrics = derive_metrics(&confusion);
    let roc = roc_curve(scores, labels)?;
    let auc = roc.auc();

    debug!(threshold, auc, samples = scores.len(), "evaluation complete");

    Ok(EvaluationReport {
        confusion,
        metrics,
        threshold,
        auc,
        roc,
    })
}

impl EvaluationReport {
    /// Flatten the report into the fixed metric key set.
    pub fn metric_map(&self) -> BTreeMap<&'static str, f64> {
        let mut map = BTreeMap::new();
        map.insert("true_positives", self.confusion.true_positives as f64);
        map.insert("false_positives", self.confusion.false_positives as f64);
        map.insert("true_negatives", self.confusion.true_negatives as f64);
        map.insert("false_negatives", self.confusion.false_negatives as f64);
        map.insert("accuracy", self.metrics.accuracy);
        map.insert("precision", self.metrics.precision);
        map.insert("recall", self.metrics.recall);
        map.insert("specificity", self.metrics.specificity);
        map.insert("f1_score", self.metrics.f1_score);
        map.insert("threshold", self.threshold);
        map.insert("auc", self.auc);
        map
    }

    /// Render the formatted evaluation banner.
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str("\n===== Algorithm Evaluation Results =====\n");
        output.push_str(&format!("Threshold: {:.6}\n", self.threshold));

        output.push_str("\nConfusion Matrix:\n");
        output.push_str(&format!(
            "TP: {}\tFP: {}\n",
            self.confusion.true_positives, self.confusion.false_positives
        ));
        output.push_str(&format!(
            "FN: {}\tTN: {}\n",
            self.confusion.false_negatives, self.confusion.true_negatives
        ));

        output.push_str("\nMetrics:\n");
        output.push_str(&format!("accuracy: {:.2}%\n", self.metrics.accuracy * 100.0));
        output.push_str(&format!(
            "precision: {:.2}%\n",
            self.metrics.precision * 100.0
        ));
        output.push_str(&format!("recall: {:.2}%\n", self.metrics.recall * 100.0));
        output.push_str(&format!(
            "specificity: {:.2}%\n",
            self.metrics.specificity * 100.0
        ));
        output.push_str(&format!("f1_score: {:.2}%\n", self.metrics.f1_score * 100.0));
        output.push_str(&format!("auc: {:.4}\n", self.auc));
        output.push_str("=======================================\n");

        output
    }
}
