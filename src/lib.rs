//! Centinela - unsupervised anomaly scoring and evaluation for tabular data
//!
//! This library provides the two engines every anomaly-detection experiment
//! needs: scorers (Isolation Forest, distance-based local outlier, weighted
//! z-score) that turn a feature matrix into per-sample anomaly scores, and
//! an evaluation engine that turns scores plus ground-truth labels into a
//! confusion matrix, derived metrics, a tie-aware ROC curve, and AUC.
//!
//! Score polarity is uniform across the crate: higher = more anomalous.

pub mod cli;
pub mod csv_output;
pub mod dataset;
pub mod evaluation;
pub mod isolation_forest;
pub mod local_outlier;
pub mod normalize;
pub mod random;
pub mod sample;
pub mod stats;
pub mod zscore;
