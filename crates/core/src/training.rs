//! Offline training pipeline.
//!
//! `sample → stratified split → fit scaler → fit forest → evaluate → artifact`.
//!
//! Every random step is seeded from [`TrainingParams::seed`], so the same dataset and parameters
//! always produce the same forest and the same evaluation.

use crate::artifact::ClassifierArtifact;
use crate::constants::{
    DEFAULT_SAMPLE_SIZE, DEFAULT_SEED, DEFAULT_TEST_FRACTION, KNOWN_CLASSES,
};
use crate::dataset::Dataset;
use crate::forest::{ForestParams, RandomForest};
use crate::scaler::StandardScaler;
use crate::{CoreError, CoreResult};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct TrainingParams {
    /// Rows drawn from the dataset before splitting.
    pub sample_size: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub forest: ForestParams,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            forest: ForestParams::default(),
        }
    }
}

/// A trained artifact and how it scored on the held-out rows.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifact: ClassifierArtifact,
    pub evaluation: Evaluation,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Trains a classifier artifact on `dataset`.
///
/// # Errors
///
/// Returns `CoreError::Dataset` if the dataset is empty or cannot be split, and
/// `CoreError::Training` if fitting fails.
pub fn train(dataset: &Dataset, params: &TrainingParams) -> CoreResult<TrainingOutcome> {
    if dataset.is_empty() {
        return Err(CoreError::Dataset("dataset has no rows".into()));
    }

    let sample = dataset.sample(params.sample_size, params.seed);
    let (train_set, test_set) = sample.stratified_split(params.test_fraction, params.seed)?;
    tracing::info!(
        sampled = sample.len(),
        train = train_set.len(),
        test = test_set.len(),
        "split dataset"
    );

    let scaler = StandardScaler::fit(train_set.features())?;
    let x_train = scaler.transform_all(train_set.features());
    let y_train = class_indices(train_set.labels())?;

    let forest = RandomForest::fit(
        &params.forest,
        &x_train,
        &y_train,
        KNOWN_CLASSES.len(),
        params.seed,
    )?;

    let y_test = class_indices(test_set.labels())?;
    let predicted = test_set
        .features()
        .iter()
        .map(|row| forest.predict_index(&scaler.transform(row)))
        .collect::<CoreResult<Vec<usize>>>()?;
    let evaluation = Evaluation::from_predictions(&KNOWN_CLASSES, &y_test, &predicted)?;
    tracing::info!(accuracy = evaluation.accuracy, "evaluated forest on held-out rows");

    let artifact = ClassifierArtifact::new(
        scaler,
        forest,
        KNOWN_CLASSES.to_vec(),
        train_set.len(),
        params.forest.clone(),
    )?;

    Ok(TrainingOutcome {
        artifact,
        evaluation,
        train_rows: train_set.len(),
        test_rows: test_set.len(),
    })
}

fn class_indices(labels: &[i64]) -> CoreResult<Vec<usize>> {
    labels
        .iter()
        .map(|label| {
            KNOWN_CLASSES
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| CoreError::Training(format!("unknown class label {label}")))
        })
        .collect()
}

// ============================================================================
// EVALUATION
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class: i64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Precision, recall and F1 averaged over classes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Scores of a classifier on labelled rows.
///
/// `Display` prints the classification report; [`Evaluation::confusion_table`] prints the
/// confusion matrix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub classes: Vec<i64>,
    /// `confusion[actual][predicted]`
    pub confusion: Vec<Vec<usize>>,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Evaluation {
    /// Scores `predicted` against `actual`, both given as indices into `classes`.
    ///
    /// Precision or recall with a zero denominator counts as `0.0`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Training` if the slices differ in length, are empty, or hold an index
    /// outside `classes`.
    pub fn from_predictions(
        classes: &[i64],
        actual: &[usize],
        predicted: &[usize],
    ) -> CoreResult<Self> {
        if actual.len() != predicted.len() || actual.is_empty() {
            return Err(CoreError::Training(format!(
                "cannot evaluate {} predictions against {} labels",
                predicted.len(),
                actual.len()
            )));
        }
        let n = classes.len();
        if actual.iter().chain(predicted).any(|i| *i >= n) {
            return Err(CoreError::Training("class index out of range".into()));
        }

        let mut confusion = vec![vec![0usize; n]; n];
        for (a, p) in actual.iter().zip(predicted) {
            confusion[*a][*p] += 1;
        }

        let per_class: Vec<ClassMetrics> = (0..n)
            .map(|k| {
                let tp = confusion[k][k];
                let predicted_k: usize = confusion.iter().map(|row| row[k]).sum();
                let support: usize = confusion[k].iter().sum();
                let precision = ratio(tp, predicted_k);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    class: classes[k],
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total = actual.len();
        let correct: usize = (0..n).map(|k| confusion[k][k]).sum();
        let mean = |f: fn(&ClassMetrics) -> f64| per_class.iter().map(f).sum::<f64>() / n as f64;
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            per_class
                .iter()
                .map(|m| f(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        };

        Ok(Self {
            classes: classes.to_vec(),
            accuracy: ratio(correct, total),
            macro_avg: AverageMetrics {
                precision: mean(|m| m.precision),
                recall: mean(|m| m.recall),
                f1: mean(|m| m.f1),
            },
            weighted_avg: AverageMetrics {
                precision: weighted(|m| m.precision),
                recall: weighted(|m| m.recall),
                f1: weighted(|m| m.f1),
            },
            confusion,
            per_class,
            support: total,
        })
    }

    /// Confusion matrix with actual classes as rows and predicted classes as columns.
    pub fn confusion_table(&self) -> String {
        let mut out = format!("{:>12}", "actual\\pred");
        for class in &self.classes {
            out.push_str(&format!("{class:>8}"));
        }
        out.push('\n');
        for (class, row) in self.classes.iter().zip(&self.confusion) {
            out.push_str(&format!("{class:>12}"));
            for count in row {
                out.push_str(&format!("{count:>8}"));
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                m.class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.4} {:>10}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        Ok(())
    }
}
