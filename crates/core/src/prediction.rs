//! Prediction service.
//!
//! Owns a loaded classifier and turns encoded feature vectors into [`PredictionResult`]s.
//!
//! ## Lifecycle
//!
//! ```text
//! PredictionService<Uninitialised> --load()--> PredictionService<Ready>
//!                                                   |
//!                                                   | inference error
//!                                                   v
//!                                            Ready (failed: every call returns ServiceFailed)
//! ```
//!
//! `Uninitialised` has no `predict`, so predicting before a successful load does not compile.
//! A failed load consumes the service and returns the error. Once a `Ready` service has seen an
//! inference error it stays failed; construct a new instance to retry.

use crate::artifact::{ClassifierArtifact, ModelInfo};
use crate::bmi::{Bmi, BmiCategory};
use crate::classifier::{Classifier, DiabetesClass};
use crate::config::CoreConfig;
use crate::features::{Feature, FeatureVector};
use crate::{CoreError, CoreResult};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// TYPE-STATE MARKERS
// ============================================================================

/// Marker type: no classifier has been loaded yet.
///
/// Only `load()` can be called in this state.
#[derive(Clone, Copy, Debug)]
pub struct Uninitialised;

/// Marker type: a classifier is loaded and predictions can be made.
pub struct Ready {
    classifier: Arc<dyn Classifier>,
    info: Option<ModelInfo>,
    failed: AtomicBool,
}

impl Drop for Ready {
    fn drop(&mut self) {
        tracing::debug!(
            failed = self.failed.load(Ordering::Relaxed),
            "prediction service released classifier"
        );
    }
}

/// Observable state of a loaded service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ServiceState {
    Ready,
    Failed,
}

/// Outcome of one prediction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    pub class: DiabetesClass,
    pub bmi: Bmi,
    pub bmi_category: BmiCategory,
}

// ============================================================================
// PREDICTION SERVICE
// ============================================================================

/// Service that maps feature vectors to diabetes predictions.
///
/// Generic parameter `S` is either `Uninitialised` or `Ready`.
pub struct PredictionService<S> {
    cfg: Arc<CoreConfig>,
    state: S,
}

impl PredictionService<Uninitialised> {
    /// Creates a service that will load its artifact from `cfg.model_path()`.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Core configuration carrying the artifact path and checksum policy
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            state: Uninitialised,
        }
    }

    /// Loads the classifier artifact.
    ///
    /// **This method consumes `self`**; on failure the uninitialised service is gone and the
    /// caller gets the error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ArtifactUnavailable`] if the artifact is missing, corrupt, fails its
    /// checksum, or was written for a different schema or feature order.
    pub fn load(self) -> CoreResult<PredictionService<Ready>> {
        let artifact =
            ClassifierArtifact::load(self.cfg.model_path(), self.cfg.require_checksum())?;
        Ok(PredictionService::from_artifact(self.cfg, Arc::new(artifact)))
    }
}

impl PredictionService<Ready> {
    /// Creates a ready service over an artifact that is already loaded.
    ///
    /// Servers load once at startup and hand every request its own service over the shared
    /// artifact, so a failure in one request does not poison the others.
    pub fn from_artifact(cfg: Arc<CoreConfig>, artifact: Arc<ClassifierArtifact>) -> Self {
        let info = Some(artifact.info());
        Self {
            cfg,
            state: Ready {
                classifier: artifact,
                info,
                failed: AtomicBool::new(false),
            },
        }
    }

    /// Creates a ready service over any [`Classifier`].
    pub fn with_classifier(cfg: Arc<CoreConfig>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            cfg,
            state: Ready {
                classifier,
                info: None,
                failed: AtomicBool::new(false),
            },
        }
    }

    pub fn state(&self) -> ServiceState {
        if self.state.failed.load(Ordering::Acquire) {
            ServiceState::Failed
        } else {
            ServiceState::Ready
        }
    }

    /// Metadata of the loaded artifact, or `None` for a bare classifier.
    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.state.info.as_ref()
    }

    /// Predicts the diabetes class for `features`.
    ///
    /// The BMI and its category are read back from the vector so the result always describes the
    /// row that was classified.
    ///
    /// # Errors
    ///
    /// - [`CoreError::ServiceFailed`] if an earlier call failed
    /// - [`CoreError::UnexpectedClassLabel`] if the classifier emits a value outside `{0, 1, 2}`
    /// - [`CoreError::Classifier`] if inference itself fails
    ///
    /// The last two move the service into the failed state.
    pub fn predict(&self, features: &FeatureVector) -> CoreResult<PredictionResult> {
        if self.state.failed.load(Ordering::Acquire) {
            return Err(CoreError::ServiceFailed);
        }

        let class = self
            .state
            .classifier
            .predict(features)
            .and_then(DiabetesClass::from_class_value)
            .map_err(|err| {
                self.state.failed.store(true, Ordering::Release);
                tracing::error!(error = %err, "inference failed; prediction service is now failed");
                err
            })?;

        let bmi = Bmi::from_value(features.get(Feature::Bmi));
        tracing::debug!(class = class.label(), bmi = %bmi, "prediction made");

        Ok(PredictionResult {
            class,
            bmi,
            bmi_category: bmi.category(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::tests::{bmi_artifact, vector_with_bmi};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    struct FixedClassifier {
        value: i64,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(value: i64) -> Arc<Self> {
            Arc::new(Self {
                value,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, _features: &FeatureVector) -> CoreResult<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value)
        }
    }

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn predict(&self, _features: &FeatureVector) -> CoreResult<i64> {
            Err(CoreError::Classifier("tree walk fell off the end".into()))
        }
    }

    fn test_cfg(model_path: std::path::PathBuf) -> Arc<CoreConfig> {
        Arc::new(CoreConfig::new(model_path, false).expect("config should be valid"))
    }

    #[test]
    fn test_predict_maps_class_and_bmi() {
        let service = PredictionService::with_classifier(
            test_cfg("model.json".into()),
            FixedClassifier::new(2),
        );

        let result = service.predict(&vector_with_bmi(31.2)).expect("predict should succeed");

        assert_eq!(result.class, DiabetesClass::Diabetes);
        assert_eq!(result.bmi.value(), 31.2);
        assert_eq!(result.bmi_category, BmiCategory::Obese);
        assert_eq!(service.state(), ServiceState::Ready);
    }

    #[test]
    fn test_predict_is_idempotent() {
        let classifier = FixedClassifier::new(1);
        let service = PredictionService::with_classifier(
            test_cfg("model.json".into()),
            classifier.clone(),
        );
        let features = vector_with_bmi(22.0);

        let first = service.predict(&features).unwrap();
        let second = service.predict(&features).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.class, DiabetesClass::Prediabetes);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unexpected_label_fails_the_service() {
        let classifier = FixedClassifier::new(7);
        let service = PredictionService::with_classifier(
            test_cfg("model.json".into()),
            classifier.clone(),
        );

        let err = service
            .predict(&vector_with_bmi(22.0))
            .expect_err("label 7 should be rejected");
        assert!(matches!(err, CoreError::UnexpectedClassLabel(7)));
        assert_eq!(service.state(), ServiceState::Failed);

        let err = service
            .predict(&vector_with_bmi(22.0))
            .expect_err("failed service should reject further calls");
        assert!(matches!(err, CoreError::ServiceFailed));
        assert_eq!(
            classifier.calls.load(Ordering::SeqCst),
            1,
            "a failed service must not call the classifier again"
        );
    }

    #[test]
    fn test_classifier_error_fails_the_service() {
        let service = PredictionService::with_classifier(
            test_cfg("model.json".into()),
            Arc::new(BrokenClassifier),
        );

        assert!(matches!(
            service.predict(&vector_with_bmi(22.0)),
            Err(CoreError::Classifier(_))
        ));
        assert!(matches!(
            service.predict(&vector_with_bmi(22.0)),
            Err(CoreError::ServiceFailed)
        ));
    }

    #[test]
    fn test_load_missing_artifact_is_unavailable() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = PredictionService::new(test_cfg(temp_dir.path().join("missing.json")));

        let err = service.load().err().expect("load should fail");
        assert!(matches!(err, CoreError::ArtifactUnavailable { .. }));
    }

    #[test]
    fn test_load_and_predict_from_saved_artifact() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("model.json");
        bmi_artifact(vec![0, 1, 2]).save(&path).expect("save should succeed");

        let service = PredictionService::new(test_cfg(path))
            .load()
            .expect("load should succeed");

        let info = service.model_info().expect("artifact service should expose info");
        assert_eq!(info.tree_count, 5);
        assert!(info.checksum.is_some());
        assert_eq!(
            service.predict(&vector_with_bmi(19.0)).unwrap().class,
            DiabetesClass::NoDiabetes
        );
        assert_eq!(
            service.predict(&vector_with_bmi(36.0)).unwrap().class,
            DiabetesClass::Diabetes
        );
    }

    #[test]
    fn test_artifact_with_foreign_class_values_fails_at_inference() {
        let artifact = Arc::new(bmi_artifact(vec![0, 1, 9]));
        let service = PredictionService::from_artifact(test_cfg("model.json".into()), artifact);

        let err = service
            .predict(&vector_with_bmi(36.0))
            .expect_err("class 9 should be rejected");
        assert!(matches!(err, CoreError::UnexpectedClassLabel(9)));
        assert_eq!(service.state(), ServiceState::Failed);
    }
}
