//! Isolation Forest for unsupervised anomaly scoring
//!
//! Builds an ensemble of randomized binary partition trees over subsamples of
//! the added samples. A sample that separates from the rest in few random
//! splits has a short average path length across the ensemble and therefore a
//! high anomaly score.
//!
//! Score polarity: [`Forest::anomaly_score`] returns values in (0, 1] where
//! **higher means more anomalous**. Every caller-facing score in this crate
//! follows the same convention; no `1 - score` inversion is ever needed.
//!
//! # References
//!
//! Liu, F. T., Ting, K. M., & Zhou, Z. H. (2008). Isolation forest.
//! In 2008 Eighth IEEE International Conference on Data Mining (pp. 413-422).

use crate::random::{RandomSource, ThreadRandom};
use crate::sample::Sample;
use thiserror::Error;
use tracing::debug;

/// Default ensemble size (following the original paper)
pub const DEFAULT_NUM_TREES: usize = 100;

/// Default sub-sampling size (following the original paper)
pub const DEFAULT_SUBSAMPLE_SIZE: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Errors for forest construction and scoring
#[derive(Error, Debug)]
pub enum ForestError {
    #[error("forest is already built; call reset() before create()")]
    AlreadyBuilt,

    #[error("forest is not built; call create() before scoring")]
    NotBuilt,

    #[error("cannot add samples to a built forest")]
    AddAfterBuild,

    #[error("no samples added to the forest")]
    NoSamples,

    #[error("sample '{id}' is missing feature '{name}'")]
    MissingFeature { id: String, name: String },

    #[error("sample '{id}' has {actual} features, expected {expected}")]
    FeatureCountMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, ForestError>;

/// A node in an isolation tree
#[derive(Debug)]
enum TreeNode {
    /// Internal node with split feature and value
    Internal {
        feature_idx: usize,
        split_value: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Leaf node with sample count (for path length calculation)
    Leaf { size: usize },
}

impl TreeNode {
    /// Path length from root to the leaf this row lands in
    fn path_length(&self, row: &[f64], current_depth: usize) -> f64 {
        match self {
            TreeNode::Internal {
                feature_idx,
                split_value,
                left,
                right,
            } => {
                if row[*feature_idx] < *split_value {
                    left.path_length(row, current_depth + 1)
                } else {
                    right.path_length(row, current_depth + 1)
                }
            }
            // A leaf covering more than one training sample gets the
            // expected unsuccessful-search depth of a BST over its size.
            TreeNode::Leaf { size } => current_depth as f64 + average_path_length(*size),
        }
    }
}

/// Expected path length `c(n)` of an unsuccessful BST search over n items:
/// `2·H(n-1) - 2(n-1)/n`, harmonic number via `ln` plus Euler-Mascheroni.
fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let m = (n - 1) as f64;
    2.0 * (m.ln() + EULER_GAMMA) - 2.0 * m / n as f64
}

/// Single randomized partition tree
#[derive(Debug)]
struct IsolationTree {
    root: TreeNode,
}

impl IsolationTree {
    fn build(rows: &[Vec<f64>], max_depth: usize, rng: &mut dyn RandomSource) -> Self {
        let root = Self::build_node(rows, 0, max_depth, rng);
        IsolationTree { root }
    }

    fn build_node(
        rows: &[Vec<f64>],
        depth: usize,
        max_depth: usize,
        rng: &mut dyn RandomSource,
    ) -> TreeNode {
        if depth >= max_depth || rows.len() <= 1 {
            return TreeNode::Leaf { size: rows.len() };
        }

        let num_features = rows[0].len();
        let feature_idx = rng.next_u64_in_range(0, (num_features - 1) as u64) as usize;

        let mut min_val = f64::MAX;
        let mut max_val = f64::MIN;
        for row in rows {
            let val = row[feature_idx];
            min_val = min_val.min(val);
            max_val = max_val.max(val);
        }

        // No valid split when every value of the chosen feature is identical.
        if (max_val - min_val).abs() < f64::EPSILON {
            return TreeNode::Leaf { size: rows.len() };
        }

        let split_value = rng.next_f64_in_range(min_val, max_val);

        let (left_rows, right_rows): (Vec<Vec<f64>>, Vec<Vec<f64>>) = rows
            .iter()
            .cloned()
            .partition(|row| row[feature_idx] < split_value);

        if left_rows.is_empty() || right_rows.is_empty() {
            return TreeNode::Leaf { size: rows.len() };
        }

        let left = Box::new(Self::build_node(&left_rows, depth + 1, max_depth, rng));
        let right = Box::new(Self::build_node(&right_rows, depth + 1, max_depth, rng));

        TreeNode::Internal {
            feature_idx,
            split_value,
            left,
            right,
        }
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        self.root.path_length(row, 0)
    }
}

/// Draw one subsample for a tree.
///
/// Subsampling policy: without replacement (partial Fisher-Yates over the
/// pool indices) when the pool holds at least `size` samples; with
/// replacement when the pool is smaller than the requested size, so every
/// tree still sees `size` rows.
fn draw_subsample(
    pool: &[Vec<f64>],
    size: usize,
    rng: &mut dyn RandomSource,
) -> Vec<Vec<f64>> {
    let last = (pool.len() - 1) as u64;
    if pool.len() >= size {
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        for i in 0..size {
            let j = rng.next_u64_in_range(i as u64, last) as usize;
            indices.swap(i, j);
        }
        indices[..size].iter().map(|&i| pool[i].clone()).collect()
    } else {
        (0..size)
            .map(|_| pool[rng.next_u64_in_range(0, last) as usize].clone())
            .collect()
    }
}

/// Isolation Forest - ensemble of randomized partition trees
///
/// Lifecycle is a strict two-state machine: samples are added while the
/// forest is unbuilt, [`Forest::create`] transitions it to built exactly
/// once, and only a built forest scores. Violations are typed errors, not
/// silent fallbacks; [`Forest::reset`] is the explicit way back.
pub struct Forest {
    feature_names: Vec<String>,
    pool: Vec<Vec<f64>>,
    trees: Vec<IsolationTree>,
    num_trees: usize,
    sub_sampling_size: usize,
    rng: Box<dyn RandomSource>,
    built: bool,
}

impl Forest {
    /// Create an unbuilt forest with a nondeterministic randomness source.
    pub fn new(num_trees: usize, sub_sampling_size: usize) -> Self {
        Self::with_random_source(num_trees, sub_sampling_size, Box::new(ThreadRandom::new()))
    }

    /// Create an unbuilt forest drawing from the given randomness source.
    ///
    /// A seeded source plus a fixed sample order makes scores bit-identical
    /// across runs.
    pub fn with_random_source(
        num_trees: usize,
        sub_sampling_size: usize,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        assert!(num_trees > 0, "forest needs at least one tree");
        assert!(
            sub_sampling_size > 0,
            "subsample size must be at least one"
        );
        Self {
            feature_names: Vec::new(),
            pool: Vec::new(),
            trees: Vec::new(),
            num_trees,
            sub_sampling_size,
            rng,
            built: false,
        }
    }

    /// Append a sample to the pool (unbuilt state only).
    ///
    /// The first sample fixes the forest's feature set; every later sample
    /// must carry exactly the same feature names.
    pub fn add_sample(&mut self, sample: &Sample) -> Result<()> {
        if self.built {
            return Err(ForestError::AddAfterBuild);
        }
        if self.feature_names.is_empty() && self.pool.is_empty() {
            self.feature_names = sample
                .features()
                .iter()
                .map(|f| f.name().to_string())
                .collect();
        }
        let row = self.resolve_row(sample)?;
        self.pool.push(row);
        Ok(())
    }

    /// Build the ensemble. Valid exactly once per lifecycle.
    pub fn create(&mut self) -> Result<()> {
        if self.built {
            return Err(ForestError::AlreadyBuilt);
        }
        if self.pool.is_empty() {
            return Err(ForestError::NoSamples);
        }

        let max_depth = (self.sub_sampling_size as f64).log2().ceil() as usize;

        for _ in 0..self.num_trees {
            let subsample = draw_subsample(&self.pool, self.sub_sampling_size, self.rng.as_mut());
            let tree = IsolationTree::build(&subsample, max_depth, self.rng.as_mut());
            self.trees.push(tree);
        }
        self.built = true;

        debug!(
            trees = self.trees.len(),
            subsample = self.sub_sampling_size,
            pool = self.pool.len(),
            "isolation forest built"
        );
        Ok(())
    }

    /// Return the forest to the unbuilt state, keeping the sample pool.
    pub fn reset(&mut self) {
        self.trees.clear();
        self.built = false;
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Average path length of a sample across all trees (built state only).
    pub fn average_path_length(&self, sample: &Sample) -> Result<f64> {
        if !self.built {
            return Err(ForestError::NotBuilt);
        }
        let row = self.resolve_row(sample)?;
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(&row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Normalized anomaly score `2^(-avg_path / c(subsample_size))` in (0, 1].
    ///
    /// Higher = more anomalous: values near 1 mean the sample isolates in
    /// very few splits, values near 0 mean it is buried among normal points.
    pub fn anomaly_score(&self, sample: &Sample) -> Result<f64> {
        let avg = self.average_path_length(sample)?;
        let c = average_path_length(self.sub_sampling_size);
        if c <= 0.0 {
            // Subsample size of 1: every tree is a bare leaf and every
            // sample isolates immediately.
            return Ok(1.0);
        }
        Ok(2_f64.powf(-avg / c))
    }

    /// Map a sample's named features onto the forest's feature order.
    fn resolve_row(&self, sample: &Sample) -> Result<Vec<f64>> {
        if sample.features().len() != self.feature_names.len() {
            return Err(ForestError::FeatureCountMismatch {
                id: sample.id().to_string(),
                expected: self.feature_names.len(),
                actual: sample.features().len(),
            });
        }
        self.feature_names
            .iter()
            .map(|name| {
                sample
                    .feature_value(name)
                    .ok_or_else(|| ForestError::MissingFeature {
                        id: sample.id().to_string(),
                        name: name.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::sample::Feature;

    fn sample(id: &str, values: &[f64]) -> Sample {
        let features = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Feature::new(format!("f{}", i), v))
            .collect();
        Sample::with_features(id, features)
    }

    fn seeded_forest(trees: usize, subsample: usize, seed: u64) -> Forest {
        Forest::with_random_source(trees, subsample, Box::new(SeededRandom::new(seed)))
    }

    fn cluster_with_outlier() -> Vec<Sample> {
        let mut samples = vec![
            sample("s0", &[1.0, 2.0]),
            sample("s1", &[1.1, 2.1]),
            sample("s2", &[0.9, 1.9]),
            sample("s3", &[1.2, 2.2]),
            sample("s4", &[1.0, 2.05]),
            sample("s5", &[0.95, 1.95]),
            sample("s6", &[1.05, 2.15]),
        ];
        samples.push(sample("outlier", &[10.0, 20.0]));
        samples
    }

    #[test]
    fn test_outlier_scores_higher_than_inliers() {
        let mut forest = seeded_forest(100, 8, 42);
        for s in cluster_with_outlier() {
            forest.add_sample(&s).unwrap();
        }
        forest.create().unwrap();

        let outlier_score = forest.anomaly_score(&sample("q1", &[10.0, 20.0])).unwrap();
        let normal_score = forest.anomaly_score(&sample("q2", &[1.0, 2.0])).unwrap();

        assert!(
            outlier_score > normal_score,
            "outlier score ({}) should be > normal score ({})",
            outlier_score,
            normal_score
        );
    }

    #[test]
    fn test_score_is_in_unit_interval() {
        let mut forest = seeded_forest(50, 4, 1);
        for s in cluster_with_outlier() {
            forest.add_sample(&s).unwrap();
        }
        forest.create().unwrap();

        for s in cluster_with_outlier() {
            let score = forest.anomaly_score(&s).unwrap();
            assert!(score > 0.0 && score <= 1.0, "score {} out of (0, 1]", score);
        }
    }

    #[test]
    fn test_seeded_forest_is_reproducible() {
        let samples = cluster_with_outlier();

        let mut a = seeded_forest(50, 4, 99);
        let mut b = seeded_forest(50, 4, 99);
        for s in &samples {
            a.add_sample(s).unwrap();
            b.add_sample(s).unwrap();
        }
        a.create().unwrap();
        b.create().unwrap();

        for s in &samples {
            let score_a = a.anomaly_score(s).unwrap();
            let score_b = b.anomaly_score(s).unwrap();
            assert_eq!(score_a.to_bits(), score_b.to_bits());
        }
    }

    #[test]
    fn test_score_before_create_fails() {
        let mut forest = seeded_forest(10, 4, 0);
        forest.add_sample(&sample("s0", &[1.0])).unwrap();

        let err = forest.anomaly_score(&sample("s0", &[1.0])).unwrap_err();
        assert!(matches!(err, ForestError::NotBuilt));
    }

    #[test]
    fn test_double_create_fails() {
        let mut forest = seeded_forest(10, 4, 0);
        forest.add_sample(&sample("s0", &[1.0])).unwrap();
        forest.add_sample(&sample("s1", &[2.0])).unwrap();
        forest.create().unwrap();

        let err = forest.create().unwrap_err();
        assert!(matches!(err, ForestError::AlreadyBuilt));
    }

    #[test]
    fn test_reset_allows_rebuild() {
        let mut forest = seeded_forest(10, 4, 0);
        forest.add_sample(&sample("s0", &[1.0])).unwrap();
        forest.add_sample(&sample("s1", &[2.0])).unwrap();
        forest.create().unwrap();

        forest.reset();
        assert!(!forest.is_built());
        forest.create().unwrap();
        assert!(forest.is_built());
    }

    #[test]
    fn test_add_after_create_fails() {
        let mut forest = seeded_forest(10, 4, 0);
        forest.add_sample(&sample("s0", &[1.0])).unwrap();
        forest.create().unwrap();

        let err = forest.add_sample(&sample("s1", &[2.0])).unwrap_err();
        assert!(matches!(err, ForestError::AddAfterBuild));
    }

    #[test]
    fn test_create_without_samples_fails() {
        let mut forest = seeded_forest(10, 4, 0);
        let err = forest.create().unwrap_err();
        assert!(matches!(err, ForestError::NoSamples));
    }

    #[test]
    fn test_inconsistent_feature_set_rejected() {
        let mut forest = seeded_forest(10, 4, 0);
        forest
            .add_sample(&Sample::with_features(
                "s0",
                vec![Feature::new("mean", 1.0), Feature::new("var", 2.0)],
            ))
            .unwrap();

        let renamed = Sample::with_features(
            "s1",
            vec![Feature::new("mean", 1.0), Feature::new("skew", 2.0)],
        );
        assert!(matches!(
            forest.add_sample(&renamed).unwrap_err(),
            ForestError::MissingFeature { .. }
        ));

        let short = Sample::with_features("s2", vec![Feature::new("mean", 1.0)]);
        assert!(matches!(
            forest.add_sample(&short).unwrap_err(),
            ForestError::FeatureCountMismatch { .. }
        ));
    }

    #[test]
    fn test_scoring_sample_with_missing_feature_fails() {
        let mut forest = seeded_forest(10, 4, 0);
        forest
            .add_sample(&Sample::with_features(
                "s0",
                vec![Feature::new("mean", 1.0), Feature::new("var", 2.0)],
            ))
            .unwrap();
        forest
            .add_sample(&Sample::with_features(
                "s1",
                vec![Feature::new("mean", 3.0), Feature::new("var", 4.0)],
            ))
            .unwrap();
        forest.create().unwrap();

        let probe = Sample::with_features(
            "q",
            vec![Feature::new("mean", 1.0), Feature::new("skew", 0.0)],
        );
        assert!(matches!(
            forest.anomaly_score(&probe).unwrap_err(),
            ForestError::MissingFeature { .. }
        ));
    }

    #[test]
    fn test_constant_feature_terminates_with_leaves() {
        // Single tree over a single constant feature: no valid split
        // exists, so create() must terminate with a bare leaf.
        let mut forest = seeded_forest(1, 8, 3);
        for i in 0..8 {
            forest.add_sample(&sample(&format!("s{}", i), &[5.0])).unwrap();
        }
        forest.create().unwrap();

        let avg = forest.average_path_length(&sample("q", &[5.0])).unwrap();
        // Root is a leaf of size 8, so the path is c(8) with no internal hops.
        assert!((avg - average_path_length(8)).abs() < 1e-12);
    }

    #[test]
    fn test_pool_smaller_than_subsample_draws_with_replacement() {
        let mut forest = seeded_forest(20, 64, 5);
        for s in cluster_with_outlier() {
            forest.add_sample(&s).unwrap();
        }
        forest.create().unwrap();

        let score = forest.anomaly_score(&sample("q", &[10.0, 20.0])).unwrap();
        assert!(score > 0.0 && score <= 1.0);
    }

    #[test]
    fn test_average_path_length_known_values() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        let apl_10 = average_path_length(10);
        assert!(apl_10 > 2.0 && apl_10 < 4.0);
        // c(n) grows with n
        assert!(average_path_length(256) > average_path_length(64));
    }

    #[test]
    fn test_subsample_size_one_scores_max() {
        let mut forest = seeded_forest(5, 1, 0);
        forest.add_sample(&sample("s0", &[1.0])).unwrap();
        forest.add_sample(&sample("s1", &[2.0])).unwrap();
        forest.create().unwrap();

        assert_eq!(forest.anomaly_score(&sample("q", &[1.0])).unwrap(), 1.0);
    }
}
