//! The serialized classifier artifact.
//!
//! An artifact is a single JSON document:
//!
//! ```text
//! {
//!   "metadata": { "schema", "feature_names", "classes", "trained_at", "training_rows", "params" },
//!   "scaler":   { "mean": [..21], "scale": [..21] },
//!   "forest":   { "n_classes", "trees": [ { "features": [..], "tree": {..} }, ... ] }
//! }
//! ```
//!
//! Next to it an optional `<artifact>.sha256` sidecar carries the hex SHA-256 of the file, in the
//! same layout `sha256sum` prints. Loading is all-or-nothing: any I/O, checksum, parse or schema
//! problem yields [`CoreError::ArtifactUnavailable`] and no artifact.
//!
//! ## Schema checks
//! - `schema` must equal [`ARTIFACT_SCHEMA`]
//! - `feature_names` must equal [`FEATURE_NAMES`], same content and order
//! - `classes` must be non-empty, have one entry per forest class, and contain no duplicates
//! - scaler and trees must be sized for 21 features, and every tree leaf must name a forest class

use crate::classifier::Classifier;
use crate::constants::{ARTIFACT_SCHEMA, CHECKSUM_SUFFIX};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::forest::{ForestParams, RandomForest};
use crate::scaler::StandardScaler;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Descriptive header of an artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactMetadata {
    pub schema: String,
    pub feature_names: Vec<String>,
    /// Raw class value for each forest class index.
    pub classes: Vec<i64>,
    pub trained_at: DateTime<Utc>,
    pub training_rows: usize,
    pub params: ForestParams,
}

/// A trained classifier together with the preprocessing it was trained behind.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierArtifact {
    metadata: ArtifactMetadata,
    scaler: StandardScaler,
    forest: RandomForest,
    #[serde(skip)]
    checksum: Option<String>,
}

/// Summary of a loaded artifact, as exposed by the info endpoints and `glyco inspect`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelInfo {
    pub schema: String,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub tree_count: usize,
    pub trained_at: DateTime<Utc>,
    pub training_rows: usize,
    pub checksum: Option<String>,
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Location of the checksum sidecar for `artifact_path`.
pub fn checksum_path(artifact_path: &Path) -> PathBuf {
    let mut name = artifact_path.as_os_str().to_owned();
    name.push(CHECKSUM_SUFFIX);
    PathBuf::from(name)
}

impl ClassifierArtifact {
    /// Assembles a new artifact for the current schema.
    pub fn new(
        scaler: StandardScaler,
        forest: RandomForest,
        classes: Vec<i64>,
        training_rows: usize,
        params: ForestParams,
    ) -> CoreResult<Self> {
        let artifact = Self {
            metadata: ArtifactMetadata {
                schema: ARTIFACT_SCHEMA.to_string(),
                feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
                classes,
                trained_at: Utc::now(),
                training_rows,
                params,
            },
            scaler,
            forest,
            checksum: None,
        };
        artifact.validate().map_err(CoreError::Training)?;
        Ok(artifact)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Checksum of the bytes this artifact was loaded from or saved as.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            schema: self.metadata.schema.clone(),
            feature_names: self.metadata.feature_names.clone(),
            classes: self.metadata.classes.clone(),
            tree_count: self.forest.trees().len(),
            trained_at: self.metadata.trained_at,
            training_rows: self.metadata.training_rows,
            checksum: self.checksum.clone(),
        }
    }

    /// Loads and validates an artifact.
    ///
    /// When a sidecar exists its digest must match the file. When `require_checksum` is set a
    /// missing sidecar is also an error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ArtifactUnavailable`] if the file is missing or unreadable, the
    /// checksum does not match, the JSON does not match the artifact layout (the message names
    /// the failing path, e.g. `forest.trees[3].features`), or the schema checks fail.
    pub fn load(path: &Path, require_checksum: bool) -> CoreResult<Self> {
        let bytes = fs::read(path).map_err(|e| CoreError::artifact(path, e.to_string()))?;
        let digest = sha256_hex(&bytes);

        let sidecar = checksum_path(path);
        match fs::read_to_string(&sidecar) {
            Ok(contents) => {
                let expected = contents.split_whitespace().next().unwrap_or_default();
                if !expected.eq_ignore_ascii_case(&digest) {
                    tracing::warn!(path = %path.display(), "artifact checksum mismatch");
                    return Err(CoreError::artifact(
                        path,
                        format!("checksum mismatch: sidecar has '{expected}', file is '{digest}'"),
                    ));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if require_checksum {
                    return Err(CoreError::artifact(
                        path,
                        format!("checksum sidecar {} is required but missing", sidecar.display()),
                    ));
                }
            }
            Err(e) => {
                return Err(CoreError::artifact(
                    path,
                    format!("failed to read checksum sidecar: {e}"),
                ))
            }
        }

        let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
        let mut artifact: ClassifierArtifact =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
                let at = err.path().to_string();
                let at = if at.is_empty() || at == "." {
                    "<root>".to_string()
                } else {
                    at
                };
                CoreError::artifact(
                    path,
                    format!("artifact layout mismatch at {at}: {}", err.into_inner()),
                )
            })?;

        if let Err(reason) = artifact.validate() {
            tracing::warn!(path = %path.display(), %reason, "rejected incompatible artifact");
            return Err(CoreError::artifact(path, reason));
        }

        artifact.checksum = Some(digest);
        tracing::info!(
            path = %path.display(),
            trees = artifact.forest.trees().len(),
            trained_at = %artifact.metadata.trained_at,
            "loaded classifier artifact"
        );
        Ok(artifact)
    }

    /// Writes the artifact and its checksum sidecar, creating parent directories as needed.
    ///
    /// Returns the hex digest written to the sidecar.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` or `CoreError::FileWrite`.
    pub fn save(&mut self, path: &Path) -> CoreResult<String> {
        let bytes = serde_json::to_vec(self).map_err(CoreError::Serialization)?;
        let digest = sha256_hex(&bytes);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CoreError::FileWrite)?;
        }
        fs::write(path, &bytes).map_err(CoreError::FileWrite)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        fs::write(checksum_path(path), format!("{digest}  {file_name}\n"))
            .map_err(CoreError::FileWrite)?;

        self.checksum = Some(digest.clone());
        Ok(digest)
    }

    fn validate(&self) -> Result<(), String> {
        let meta = &self.metadata;
        if meta.schema != ARTIFACT_SCHEMA {
            return Err(format!(
                "unsupported schema '{}', expected '{ARTIFACT_SCHEMA}'",
                meta.schema
            ));
        }

        if meta.feature_names.len() != FEATURE_COUNT
            || meta
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(actual, expected)| actual != expected)
        {
            return Err(format!(
                "feature order mismatch: artifact has [{}], expected [{}]",
                meta.feature_names.join(", "),
                FEATURE_NAMES.join(", ")
            ));
        }

        if meta.classes.is_empty() || meta.classes.len() != self.forest.n_classes() {
            return Err(format!(
                "artifact lists {} classes but the forest predicts {}",
                meta.classes.len(),
                self.forest.n_classes()
            ));
        }
        let mut seen = meta.classes.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != meta.classes.len() {
            return Err("artifact class list contains duplicates".into());
        }

        self.scaler.validate(FEATURE_COUNT)?;
        self.forest.validate(FEATURE_COUNT)
    }
}

impl Classifier for ClassifierArtifact {
    fn predict(&self, features: &FeatureVector) -> CoreResult<i64> {
        let scaled = self.scaler.transform(features.as_slice());
        let index = self.forest.predict_index(&scaled)?;
        self.metadata.classes.get(index).copied().ok_or_else(|| {
            CoreError::Classifier(format!("forest predicted unknown class index {index}"))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::Feature;
    use tempfile::TempDir;

    /// A small artifact whose forest separates rows on the BMI column:
    /// BMI <= 25 → class 0, 25 < BMI <= 30 → class 1, BMI > 30 → class 2.
    pub(crate) fn bmi_artifact(classes: Vec<i64>) -> ClassifierArtifact {
        let (forest, params, rows) = bmi_forest();
        ClassifierArtifact::new(
            StandardScaler::identity(FEATURE_COUNT),
            forest,
            classes,
            rows,
            params,
        )
        .expect("artifact should be valid")
    }

    fn bmi_forest() -> (RandomForest, ForestParams, usize) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let bmi = 18.0 + (i as f64) * 0.4;
            let mut row = vec![0.0; FEATURE_COUNT];
            row[Feature::Bmi.index()] = bmi;
            rows.push(row);
            labels.push(if bmi <= 25.0 {
                0
            } else if bmi <= 30.0 {
                1
            } else {
                2
            });
        }
        let params = ForestParams {
            n_trees: 5,
            max_depth: None,
            min_samples_split: 2,
            max_features: Some(FEATURE_COUNT),
        };
        let forest = RandomForest::fit(&params, &rows, &labels, 3, 11).expect("fit should succeed");
        (forest, params, rows.len())
    }

    pub(crate) fn vector_with_bmi(bmi: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[Feature::Bmi.index()] = bmi;
        FeatureVector::new(values)
    }

    #[test]
    fn test_save_then_load_predicts_identically() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model").join("model.json");

        let mut artifact = bmi_artifact(vec![0, 1, 2]);
        let digest = artifact.save(&path).expect("save should succeed");
        assert!(checksum_path(&path).is_file(), "sidecar should be written");

        let loaded = ClassifierArtifact::load(&path, true).expect("load should succeed");
        assert_eq!(loaded.checksum(), Some(digest.as_str()));
        for bmi in [19.0, 27.5, 35.0] {
            let v = vector_with_bmi(bmi);
            assert_eq!(
                artifact.predict(&v).unwrap(),
                loaded.predict(&v).unwrap(),
                "prediction at BMI {bmi} should survive a round trip"
            );
        }
        assert_eq!(loaded.predict(&vector_with_bmi(19.0)).unwrap(), 0);
        assert_eq!(loaded.predict(&vector_with_bmi(35.0)).unwrap(), 2);
    }

    #[test]
    fn test_load_missing_file_is_artifact_unavailable() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = ClassifierArtifact::load(&temp_dir.path().join("nope.json"), false)
            .expect_err("missing artifact should fail");
        assert!(matches!(err, CoreError::ArtifactUnavailable { .. }));
    }

    #[test]
    fn test_load_corrupt_file_is_artifact_unavailable() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = ClassifierArtifact::load(&path, false).expect_err("corrupt artifact should fail");
        assert!(matches!(err, CoreError::ArtifactUnavailable { .. }));
    }

    #[test]
    fn test_load_reports_failing_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        let mut value = serde_json::to_value(bmi_artifact(vec![0, 1, 2])).unwrap();
        value["metadata"]["training_rows"] = serde_json::json!("many");
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = ClassifierArtifact::load(&path, false).expect_err("bad field should fail");
        assert!(
            err.to_string().contains("metadata.training_rows"),
            "error should name the failing path: {err}"
        );
    }

    #[test]
    fn test_load_rejects_reordered_features() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        let mut value = serde_json::to_value(bmi_artifact(vec![0, 1, 2])).unwrap();
        let names = value["metadata"]["feature_names"].as_array_mut().unwrap();
        names.swap(0, 1);
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err =
            ClassifierArtifact::load(&path, false).expect_err("reordered features should fail");
        assert!(matches!(err, CoreError::ArtifactUnavailable { .. }));
        assert!(err.to_string().contains("feature order mismatch"));
    }

    #[test]
    fn test_load_rejects_unknown_schema() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        let mut value = serde_json::to_value(bmi_artifact(vec![0, 1, 2])).unwrap();
        value["metadata"]["schema"] = serde_json::json!("sklearn.pickle");
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = ClassifierArtifact::load(&path, false).expect_err("unknown schema should fail");
        assert!(err.to_string().contains("unsupported schema"));
    }

    #[test]
    fn test_load_rejects_checksum_mismatch() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        bmi_artifact(vec![0, 1, 2]).save(&path).unwrap();
        fs::write(checksum_path(&path), "deadbeef  model.json\n").unwrap();

        let err = ClassifierArtifact::load(&path, false).expect_err("mismatch should fail");
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_load_requires_sidecar_when_configured() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        bmi_artifact(vec![0, 1, 2]).save(&path).unwrap();
        fs::remove_file(checksum_path(&path)).unwrap();

        assert!(ClassifierArtifact::load(&path, false).is_ok());
        assert!(ClassifierArtifact::load(&path, true).is_err());
    }

    #[test]
    fn test_new_rejects_class_count_mismatch() {
        let (forest, params, rows) = bmi_forest();
        let err = ClassifierArtifact::new(
            StandardScaler::identity(FEATURE_COUNT),
            forest,
            vec![0, 1],
            rows,
            params,
        )
        .expect_err("two classes for a three-class forest should be rejected");
        assert!(matches!(err, CoreError::Training(_)));
    }
}
