use anyhow::{Context, Result};
use centinela::cli::{Cli, Method, OutputFormat};
use centinela::evaluation::{self, EvaluationReport};
use centinela::isolation_forest::Forest;
use centinela::random::SeededRandom;
use centinela::sample::{Feature, Sample};
use centinela::stats::ScoreAnalysis;
use centinela::{csv_output, dataset, local_outlier, normalize, zscore};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Extract and min-max normalize the selected feature columns.
fn load_feature_columns(rows: &[Vec<String>], columns: &[usize]) -> Result<Vec<Vec<f64>>> {
    columns
        .iter()
        .map(|&idx| {
            let column = dataset::numeric_column(rows, idx)
                .with_context(|| format!("extracting feature column {}", idx))?;
            Ok(normalize::normalize_feature(&column))
        })
        .collect()
}

/// Transpose feature columns into one row per sample.
fn columns_to_rows(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_samples = columns.first().map_or(0, Vec::len);
    (0..n_samples)
        .map(|i| columns.iter().map(|column| column[i]).collect())
        .collect()
}

/// Score every sample with the selected method.
fn compute_scores(args: &Cli, columns: &[Vec<f64>]) -> Result<Vec<f64>> {
    match args.method {
        Method::Iforest => {
            let mut forest = match args.seed {
                Some(seed) => Forest::with_random_source(
                    args.trees,
                    args.subsample,
                    Box::new(SeededRandom::new(seed)),
                ),
                None => Forest::new(args.trees, args.subsample),
            };

            let samples: Vec<Sample> = columns_to_rows(columns)
                .into_iter()
                .enumerate()
                .map(|(i, row)| {
                    let features = args
                        .feature_columns
                        .iter()
                        .zip(row)
                        .map(|(&idx, value)| Feature::new(format!("col{}", idx), value))
                        .collect();
                    Sample::with_features(format!("sample_{}", i), features)
                })
                .collect();

            for sample in &samples {
                forest.add_sample(sample)?;
            }
            forest.create()?;

            samples
                .iter()
                .map(|sample| forest.anomaly_score(sample).map_err(Into::into))
                .collect()
        }
        Method::Lof => {
            let rows = columns_to_rows(columns);
            Ok(local_outlier::local_outlier_scores(&rows, args.neighbors)?)
        }
        Method::Zscore => Ok(zscore::weighted_zscore_scores(columns, None)?),
    }
}

fn print_report(
    report: &EvaluationReport,
    scores: &[f64],
    labels: &[bool],
    args: &Cli,
) -> Result<()> {
    match args.format {
        OutputFormat::Text => {
            if let Some(analysis) = ScoreAnalysis::compute(scores, labels) {
                print!("{}", analysis.format());
            }
            print!("{}", report.format());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.trees < 1 {
        anyhow::bail!("Invalid value for --trees: must be >= 1");
    }
    if args.subsample < 1 {
        anyhow::bail!("Invalid value for --subsample: must be >= 1");
    }
    if let Some(p) = args.threshold_percentile {
        if !(0.0..=100.0).contains(&p) {
            anyhow::bail!(
                "Invalid value for --threshold-percentile: {} (must be 0-100)",
                p
            );
        }
    }

    init_tracing(args.debug);

    let rows = dataset::read_csv(&args.input, !args.no_header)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let labels = dataset::label_column(&rows, args.label_column)?;
    let columns = load_feature_columns(&rows, &args.feature_columns)?;

    tracing::info!(
        samples = rows.len(),
        features = columns.len(),
        method = ?args.method,
        "dataset loaded"
    );

    let scores = compute_scores(&args, &columns)?;

    let threshold = match (args.threshold, args.threshold_percentile) {
        (Some(t), _) => Some(t),
        (None, Some(p)) => Some(evaluation::percentile_threshold(&scores, p)),
        (None, None) => None,
    };

    let report = evaluation::evaluate(&scores, &labels, threshold)?;

    if let Some(roc_path) = &args.roc_out {
        csv_output::write_roc_csv(&report.roc, roc_path)
            .with_context(|| format!("writing ROC CSV to {}", roc_path.display()))?;
        eprintln!("ROC data saved to {}", roc_path.display());
    }

    print_report(&report, &scores, &labels, &args)?;

    Ok(())
}
