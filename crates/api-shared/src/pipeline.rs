//! Survey-to-report pipeline shared by the REST and gRPC servers.
//!
//! The classifier is loaded once at startup and shared read-only. Every call builds its own
//! [`PredictionService`], so an inference failure fails that call only.

use glyco_core::{
    Classifier, ClassifierArtifact, CoreConfig, CoreResult, FeatureEncoder, ModelInfo,
    PredictionService, Report, SurveyResponse,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SurveyPipeline {
    cfg: Arc<CoreConfig>,
    classifier: Arc<dyn Classifier>,
    info: Option<ModelInfo>,
    encoder: FeatureEncoder,
}

impl SurveyPipeline {
    /// Loads the artifact named by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ArtifactUnavailable` if the artifact cannot be loaded.
    pub fn load(cfg: Arc<CoreConfig>) -> CoreResult<Self> {
        let artifact = ClassifierArtifact::load(cfg.model_path(), cfg.require_checksum())?;
        Ok(Self::from_artifact(cfg, Arc::new(artifact)))
    }

    pub fn from_artifact(cfg: Arc<CoreConfig>, artifact: Arc<ClassifierArtifact>) -> Self {
        Self {
            cfg,
            info: Some(artifact.info()),
            classifier: artifact,
            encoder: FeatureEncoder::new(),
        }
    }

    /// Wraps a classifier that has no artifact metadata.
    pub fn with_classifier(cfg: Arc<CoreConfig>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            cfg,
            classifier,
            info: None,
            encoder: FeatureEncoder::new(),
        }
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.info.as_ref()
    }

    /// Encodes `survey`, predicts on it and builds the report card.
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for invalid answers; nothing is sent to the classifier
    /// - `CoreError::UnexpectedClassLabel` or `CoreError::Classifier` for inference failures
    pub fn predict(&self, survey: &SurveyResponse) -> CoreResult<Report> {
        let features = self.encoder.encode(survey)?;
        let service = PredictionService::with_classifier(self.cfg.clone(), self.classifier.clone());
        let result = service.predict(&features)?;
        let report = Report::new(&features, &result);
        tracing::info!(
            prediction_id = %report.prediction_id,
            class = report.class.label(),
            bmi_category = report.bmi_category.label(),
            "survey prediction"
        );
        Ok(report)
    }
}
