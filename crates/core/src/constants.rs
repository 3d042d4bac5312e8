//! Constants used throughout the Glyco core crate.
//!
//! This module contains file names, schema tags and dataset column names so the
//! serving and training sides agree on them.

/// Default location of the trained classifier artifact.
pub const DEFAULT_MODEL_PATH: &str = "model/model.json";

/// Suffix appended to the artifact path to locate its SHA-256 sidecar.
pub const CHECKSUM_SUFFIX: &str = ".sha256";

/// Schema tag written into, and required from, every artifact.
pub const ARTIFACT_SCHEMA: &str = "glyco.random-forest.v2";

/// Label column of the BRFSS 2015 "diabetes 012" health indicators dataset.
pub const LABEL_COLUMN: &str = "Diabetes_012";

/// Raw class values the classifier is expected to emit.
pub const KNOWN_CLASSES: [i64; 3] = [0, 1, 2];

/// Inclusive bounds for the "days not good" answers.
pub const HEALTH_DAYS_MAX: i32 = 30;

/// Inclusive upper bound for age in years.
pub const AGE_MAX: u32 = 120;

/// Shown under every rendered report.
pub const DISCLAIMER: &str = "This report is generated by an AI model based on the data you provided. \
For accurate diagnosis and treatment, please consult a healthcare professional.";

/// Rows sampled from the dataset before training.
pub const DEFAULT_SAMPLE_SIZE: usize = 30_000;

/// Seed used for sampling, splitting and bootstrapping.
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of the sample held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Number of trees in the forest.
pub const DEFAULT_TREE_COUNT: usize = 100;
