//! Labelled training data from the BRFSS health indicators CSV.
//!
//! Columns are located by header name, so the file may order them freely and carry extra
//! columns. Every feature column in [`FEATURE_NAMES`] plus [`LABEL_COLUMN`] must be present.

use crate::constants::{KNOWN_CLASSES, LABEL_COLUMN};
use crate::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::{CoreError, CoreResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Feature rows with their raw class labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<i64>,
}

/// Number and share of rows carrying one class value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassCount {
    pub class: i64,
    pub count: usize,
    pub fraction: f64,
}

impl Dataset {
    /// Builds a dataset from rows already in feature order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Dataset` if the lengths differ, a row is not 21 wide, or a label is
    /// not a known class.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<i64>) -> CoreResult<Self> {
        if features.len() != labels.len() {
            return Err(CoreError::Dataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(i) = features.iter().position(|r| r.len() != FEATURE_COUNT) {
            return Err(CoreError::Dataset(format!(
                "row {i} has {} values, expected {FEATURE_COUNT}",
                features[i].len()
            )));
        }
        if let Some(label) = labels.iter().find(|l| !KNOWN_CLASSES.contains(l)) {
            return Err(CoreError::Dataset(format!("unknown class label {label}")));
        }
        Ok(Self { features, labels })
    }

    /// Reads a dataset from a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// - `CoreError::FileRead` if the file cannot be opened
    /// - `CoreError::Dataset` if a required column is missing or a value is malformed (the
    ///   message names the line)
    pub fn from_csv(path: &Path) -> CoreResult<Self> {
        let file = std::fs::File::open(path).map_err(CoreError::FileRead)?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Reads a dataset from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CoreError::Dataset(format!("missing column '{name}'")))
        };
        let label_index = column(LABEL_COLUMN)?;
        let feature_indices = FEATURE_NAMES
            .iter()
            .map(|name| column(name))
            .collect::<CoreResult<Vec<usize>>>()?;

        let mut features = Vec::new();
        let mut labels = Vec::new();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let value = |index: usize, name: &str| -> CoreResult<f64> {
                let raw = record.get(index).unwrap_or_default();
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        CoreError::Dataset(format!(
                            "line {line}: column '{name}' has invalid value '{raw}'"
                        ))
                    })
            };

            let label = value(label_index, LABEL_COLUMN)?;
            if label.fract() != 0.0 || !KNOWN_CLASSES.contains(&(label as i64)) {
                return Err(CoreError::Dataset(format!(
                    "line {line}: label {label} is not one of {KNOWN_CLASSES:?}"
                )));
            }

            let row = feature_indices
                .iter()
                .zip(FEATURE_NAMES)
                .map(|(index, name)| value(*index, name))
                .collect::<CoreResult<Vec<f64>>>()?;

            features.push(row);
            labels.push(label as i64);
        }

        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|i| self.features[*i].clone()).collect(),
            labels: indices.iter().map(|i| self.labels[*i]).collect(),
        }
    }

    /// Uniform sample of `n` rows without replacement; every row when `n >= len`.
    ///
    /// Sampled rows keep their original relative order.
    pub fn sample(&self, n: usize, seed: u64) -> Self {
        if n >= self.len() {
            return self.clone();
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices = rand::seq::index::sample(&mut rng, self.len(), n).into_vec();
        indices.sort_unstable();
        self.select(&indices)
    }

    /// Splits into `(train, test)` so each class keeps its share in both halves.
    ///
    /// Each class contributes `round(count * test_fraction)` rows to the test half, clamped so
    /// that every class present keeps at least one row in each half.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Dataset` if `test_fraction` is not strictly between 0 and 1, a class
    /// has a single row, or either half would be empty.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> CoreResult<(Self, Self)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(CoreError::Dataset(format!(
                "test fraction must be between 0 and 1, got {test_fraction}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();
        for class in KNOWN_CLASSES {
            let mut members: Vec<usize> = (0..self.len())
                .filter(|i| self.labels[*i] == class)
                .collect();
            if members.is_empty() {
                continue;
            }
            if members.len() < 2 {
                return Err(CoreError::Dataset(format!(
                    "class {class} has a single row and cannot be split"
                )));
            }
            members.shuffle(&mut rng);
            let n_test = ((members.len() as f64 * test_fraction).round() as usize)
                .clamp(1, members.len() - 1);
            test.extend_from_slice(&members[..n_test]);
            train.extend_from_slice(&members[n_test..]);
        }

        if train.is_empty() || test.is_empty() {
            return Err(CoreError::Dataset(format!(
                "split of {} rows leaves an empty half",
                self.len()
            )));
        }
        train.sort_unstable();
        test.sort_unstable();
        Ok((self.select(&train), self.select(&test)))
    }

    /// Row count per known class, in class order.
    pub fn class_distribution(&self) -> Vec<ClassCount> {
        let total = self.len().max(1) as f64;
        KNOWN_CLASSES
            .iter()
            .map(|class| {
                let count = self.labels.iter().filter(|l| *l == class).count();
                ClassCount {
                    class: *class,
                    count,
                    fraction: count as f64 / total,
                }
            })
            .collect()
    }

    /// Pearson correlation of every feature with the label, in feature order.
    ///
    /// Constant columns (and an empty dataset) report `0.0`.
    pub fn label_correlations(&self) -> Vec<(&'static str, f64)> {
        let labels: Vec<f64> = self.labels.iter().map(|l| *l as f64).collect();
        FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let column: Vec<f64> = self.features.iter().map(|r| r[i]).collect();
                (*name, pearson(&column, &labels))
            })
            .collect()
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    if x.is_empty() {
        return 0.0;
    }
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator > f64::EPSILON {
        cov / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::Feature;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// CSV with the label column last and the feature columns reversed.
    pub(crate) fn synthetic_csv(rows: usize) -> String {
        let mut header: Vec<&str> = FEATURE_NAMES.iter().rev().copied().collect();
        header.push(LABEL_COLUMN);
        let mut out = header.join(",");
        out.push('\n');

        for i in 0..rows {
            let label = (i % 3) as i64;
            let mut values = [0.0; FEATURE_COUNT];
            values[Feature::Bmi.index()] = 20.0 + 6.0 * label as f64 + (i % 5) as f64 * 0.3;
            values[Feature::HighBp.index()] = if label == 0 { 0.0 } else { 1.0 };
            values[Feature::Age.index()] = 30.0 + (i % 40) as f64;
            values[Feature::GenHlth.index()] = 1.0 + label as f64;
            let mut fields: Vec<String> = values.iter().rev().map(|v| v.to_string()).collect();
            fields.push(format!("{label}.0"));
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }

    pub(crate) fn synthetic_dataset(rows: usize) -> Dataset {
        Dataset::from_reader(synthetic_csv(rows).as_bytes()).expect("synthetic CSV should parse")
    }

    #[test]
    fn test_from_csv_maps_columns_by_header() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(synthetic_csv(6).as_bytes()).unwrap();

        let dataset = Dataset::from_csv(file.path()).expect("CSV should load");

        assert_eq!(dataset.len(), 6);
        assert_eq!(dataset.labels(), &[0, 1, 2, 0, 1, 2]);
        assert_eq!(dataset.features()[1][Feature::Bmi.index()], 26.3);
        assert_eq!(dataset.features()[1][Feature::HighBp.index()], 1.0);
        assert_eq!(dataset.features()[1][Feature::Age.index()], 31.0);
    }

    #[test]
    fn test_from_reader_rejects_missing_column() {
        let csv = "HighBP,Diabetes_012\n1,0\n";
        let err = Dataset::from_reader(csv.as_bytes()).expect_err("missing columns should fail");
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn test_from_reader_names_line_of_bad_value() {
        let csv = synthetic_csv(3).replacen("26.3", "abc", 1);
        let err = Dataset::from_reader(csv.as_bytes()).expect_err("bad value should fail");
        assert!(err.to_string().contains("line 3"), "unexpected error: {err}");
    }

    #[test]
    fn test_from_reader_rejects_unknown_label() {
        let csv = synthetic_csv(1).replace(",0.0\n", ",5.0\n");
        let err = Dataset::from_reader(csv.as_bytes()).expect_err("label 5 should fail");
        assert!(matches!(err, CoreError::Dataset(_)));
    }

    #[test]
    fn test_sample_is_deterministic_and_bounded() {
        let dataset = synthetic_dataset(100);

        let a = dataset.sample(30, 42);
        let b = dataset.sample(30, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 30);
        assert_eq!(dataset.sample(500, 42).len(), 100);
    }

    #[test]
    fn test_stratified_split_preserves_class_shares() {
        let dataset = synthetic_dataset(300);
        let (train, test) = dataset.stratified_split(0.2, 42).expect("split should succeed");

        assert_eq!(train.len() + test.len(), 300);
        assert_eq!(test.len(), 60);
        for count in test.class_distribution() {
            assert_eq!(count.count, 20, "class {} share should be kept", count.class);
        }
    }

    #[test]
    fn test_stratified_split_keeps_small_class_in_both_halves() {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..22 {
            let mut row = vec![0.0; FEATURE_COUNT];
            row[Feature::Age.index()] = i as f64;
            features.push(row);
            labels.push(match i {
                0 | 1 => 1,
                i if i % 2 == 0 => 0,
                _ => 2,
            });
        }
        let dataset = Dataset::new(features, labels).unwrap();

        let (train, test) = dataset.stratified_split(0.2, 3).expect("split should succeed");

        for half in [&train, &test] {
            for count in half.class_distribution() {
                assert!(count.count >= 1, "class {} missing from a half", count.class);
            }
        }
        assert_eq!(train.len() + test.len(), 22);
    }

    #[test]
    fn test_stratified_split_rejects_single_row_class() {
        let mut features = vec![vec![0.0; FEATURE_COUNT]; 5];
        features[0][Feature::Age.index()] = 1.0;
        let labels = vec![0, 0, 0, 0, 2];
        let dataset = Dataset::new(features, labels).unwrap();

        let err = dataset.stratified_split(0.2, 1).expect_err("one row cannot be split");
        assert!(matches!(err, CoreError::Dataset(_)));
    }

    #[test]
    fn test_stratified_split_rejects_bad_fraction() {
        let dataset = synthetic_dataset(30);
        assert!(dataset.stratified_split(0.0, 1).is_err());
        assert!(dataset.stratified_split(1.0, 1).is_err());
        assert!(dataset.stratified_split(f64::NAN, 1).is_err());
    }

    #[test]
    fn test_label_correlations() {
        let dataset = synthetic_dataset(90);
        let correlations = dataset.label_correlations();

        assert_eq!(correlations.len(), FEATURE_COUNT);
        let gen_hlth = correlations[Feature::GenHlth.index()];
        assert_eq!(gen_hlth.0, "GenHlth");
        assert!((gen_hlth.1 - 1.0).abs() < 1e-9);
        let stroke = correlations[Feature::Stroke.index()];
        assert_eq!(stroke.1, 0.0, "constant column should report zero");
    }
}
