//! CLI argument parsing for Centinela

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Scoring method to run over the selected feature columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Isolation Forest ensemble scorer
    Iforest,
    /// k-nearest-neighbor local outlier scorer
    Lof,
    /// Weighted z-score scorer
    Zscore,
}

/// Output format for the evaluation report
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "centinela")]
#[command(version)]
#[command(about = "Unsupervised anomaly scoring and ROC/AUC evaluation for tabular data", long_about = None)]
pub struct Cli {
    /// Input CSV file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Input has no header row
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Column index holding the binary anomaly label ("1" = anomaly)
    #[arg(short = 'l', long = "label-column", value_name = "INDEX", default_value = "1")]
    pub label_column: usize,

    /// Comma-separated feature column indices (e.g. -f 7,8,9,10,11)
    #[arg(
        short = 'f',
        long = "feature-columns",
        value_name = "INDICES",
        value_delimiter = ',',
        required = true
    )]
    pub feature_columns: Vec<usize>,

    /// Scoring method
    #[arg(short, long, value_enum, default_value = "iforest")]
    pub method: Method,

    /// Number of isolation trees
    #[arg(long = "trees", value_name = "N", default_value = "100")]
    pub trees: usize,

    /// Sub-sampling size per tree
    #[arg(long = "subsample", value_name = "N", default_value = "256")]
    pub subsample: usize,

    /// Seed for reproducible forest construction (default: nondeterministic)
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Neighbor count for the local outlier scorer
    #[arg(short = 'k', long = "neighbors", value_name = "K", default_value = "5")]
    pub neighbors: usize,

    /// Classification threshold (default: midpoint of per-class mean scores)
    #[arg(short = 't', long = "threshold", value_name = "T")]
    pub threshold: Option<f64>,

    /// Derive the threshold from a score percentile (0-100) instead
    #[arg(
        long = "threshold-percentile",
        value_name = "P",
        conflicts_with = "threshold"
    )]
    pub threshold_percentile: Option<f64>,

    /// Write the ROC curve to a CSV file
    #[arg(long = "roc-out", value_name = "FILE")]
    pub roc_out: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}
