//! Bagged random forest over `linfa-trees` decision trees.
//!
//! Every tree is a [`linfa_trees::DecisionTree`] fitted with Gini splits on a bootstrap sample of
//! the rows and a random subset of the columns. The tree remembers which columns it was fitted
//! on and sees only those at prediction time. The forest takes a majority vote over the trees.
//!
//! Trees serialise through linfa's `serde` support, so a fitted forest is plain JSON inside the
//! artifact.

use crate::{CoreError, CoreResult};
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Hyperparameters for [`RandomForest::fit`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows each tree until its leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Columns each tree is fitted on; `None` means every column.
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: crate::constants::DEFAULT_TREE_COUNT,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// One fitted tree and the row columns it reads, in ascending order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForestTree {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

impl ForestTree {
    pub fn features(&self) -> &[usize] {
        &self.features
    }

    fn vote(&self, row: &[f64]) -> CoreResult<usize> {
        let values = self
            .features
            .iter()
            .map(|&column| {
                row.get(column).copied().ok_or_else(|| {
                    CoreError::Classifier(format!("tree reads missing feature {column}"))
                })
            })
            .collect::<CoreResult<Vec<f64>>>()?;

        let records = Array2::from_shape_vec((1, values.len()), values)
            .map_err(|e| CoreError::Classifier(e.to_string()))?;
        let dataset = DatasetBase::from(records);
        let predictions: Array1<usize> = self.tree.predict(&dataset);
        predictions
            .first()
            .copied()
            .ok_or_else(|| CoreError::Classifier("tree returned no prediction".into()))
    }

    /// Checks the column list against `n_features` and every split and leaf of the tree.
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.features.is_empty() {
            return Err("tree reads no features".into());
        }
        if self.features.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("tree feature list is not strictly ascending".into());
        }
        if let Some(column) = self.features.iter().find(|&&c| c >= n_features) {
            return Err(format!("tree reads unknown feature {column}"));
        }

        let width = self.features.len();
        if let Some(split) = self.tree.features().into_iter().find(|&s| s >= width) {
            return Err(format!("tree splits on column {split} of {width}"));
        }
        if let Some(label) = self
            .tree
            .iter_nodes()
            .filter_map(|node| node.prediction())
            .find(|&label| label >= n_classes)
        {
            return Err(format!("leaf predicts class {label}, expected fewer than {n_classes}"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForest {
    n_classes: usize,
    trees: Vec<ForestTree>,
}

impl RandomForest {
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn trees(&self) -> &[ForestTree] {
        &self.trees
    }

    /// Share of the trees voting for each class.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Classifier` if a tree cannot read `row` or votes outside the classes.
    pub fn predict_proba(&self, row: &[f64]) -> CoreResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(CoreError::Classifier("forest has no trees".into()));
        }

        let mut votes = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let class = tree.vote(row)?;
            let slot = votes.get_mut(class).ok_or_else(|| {
                CoreError::Classifier(format!("tree voted for unknown class index {class}"))
            })?;
            *slot += 1.0;
        }

        let n = self.trees.len() as f64;
        Ok(votes.into_iter().map(|v| v / n).collect())
    }

    /// Index of the most voted class; ties go to the lowest index.
    pub fn predict_index(&self, row: &[f64]) -> CoreResult<usize> {
        let proba = self.predict_proba(row)?;
        let mut best = 0;
        for (index, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = index;
            }
        }
        Ok(best)
    }

    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.n_classes == 0 {
            return Err("forest has no classes".into());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features, self.n_classes)
                .map_err(|e| format!("tree {index}: {e}"))?;
        }
        Ok(())
    }

    /// Fits a forest on `rows` labelled with class indices `labels` in `0..n_classes`.
    ///
    /// Each tree draws its columns and bootstrap sample from its own RNG seeded from `seed` and
    /// the tree's position, so the same inputs always produce the same forest.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Training` if the inputs are empty or inconsistent, the parameters are
    /// unusable, or a tree fails to fit.
    pub fn fit(
        params: &ForestParams,
        rows: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        seed: u64,
    ) -> CoreResult<Self> {
        if rows.is_empty() {
            return Err(CoreError::Training("no training rows".into()));
        }
        if rows.len() != labels.len() {
            return Err(CoreError::Training(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(CoreError::Training("n_trees must be at least 1".into()));
        }
        if let Some(label) = labels.iter().find(|l| **l >= n_classes) {
            return Err(CoreError::Training(format!(
                "label index {label} outside 0..{n_classes}"
            )));
        }

        let n_features = rows[0].len();
        if n_features == 0 || rows.iter().any(|r| r.len() != n_features) {
            return Err(CoreError::Training("rows must share a non-zero width".into()));
        }

        let max_features = params.max_features.unwrap_or(n_features).clamp(1, n_features);
        let tree_params = DecisionTree::<f64, usize>::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(params.max_depth)
            .min_weight_split(params.min_samples_split.max(2) as f32);

        let trees = (0..params.n_trees)
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_index as u64));
                let mut features =
                    rand::seq::index::sample(&mut rng, n_features, max_features).into_vec();
                features.sort_unstable();
                let sample: Vec<usize> = (0..rows.len())
                    .map(|_| rng.gen_range(0..rows.len()))
                    .collect();

                let records = Array2::from_shape_fn((sample.len(), features.len()), |(r, c)| {
                    rows[sample[r]][features[c]]
                });
                let targets: Array1<usize> = sample.iter().map(|&i| labels[i]).collect();
                let dataset = DatasetBase::from(records).with_targets(targets);

                let tree = tree_params
                    .fit(&dataset)
                    .map_err(|e| CoreError::Training(format!("tree {tree_index}: {e}")))?;
                Ok(ForestTree { features, tree })
            })
            .collect::<CoreResult<Vec<ForestTree>>>()?;

        tracing::debug!(
            n_trees = params.n_trees,
            rows = rows.len(),
            max_features,
            "fitted random forest"
        );

        Ok(Self { n_classes, trees })
    }
}
