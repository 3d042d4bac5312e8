// Re-export the proto module from the shared `api-shared` crate so callers
// can reference `api_grpc::pb`.
pub use api_shared::pb;

use api_shared::pb::{glyco_server::Glyco, HealthRes, ModelInfoRes, PredictReq, PredictRes};
use api_shared::{auth, convert, HealthService, SurveyPipeline};
use glyco_core::CoreError;
use tonic::{Request, Response, Status};

/// Authentication interceptor for gRPC requests
#[allow(clippy::result_large_err)]
pub fn auth_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    auth::validate_metadata(req.metadata())?;
    Ok(req)
}

/// Maps a core error onto a gRPC status.
///
/// Invalid answers are the caller's fault; everything else is reported without internal detail.
pub fn status_from_error(err: &CoreError) -> Status {
    match err {
        CoreError::Validation(message) => Status::invalid_argument(message.clone()),
        CoreError::ArtifactUnavailable { .. } => Status::unavailable("Model unavailable"),
        CoreError::UnexpectedClassLabel(_)
        | CoreError::Classifier(_)
        | CoreError::ServiceFailed => {
            Status::internal("Prediction failed")
        }
        _ => Status::internal("Internal error"),
    }
}

#[derive(Clone)]
pub struct GlycoService {
    pipeline: SurveyPipeline,
}

impl GlycoService {
    pub fn new(pipeline: SurveyPipeline) -> Self {
        Self { pipeline }
    }
}

#[tonic::async_trait]
impl Glyco for GlycoService {
    async fn health(&self, _req: Request<()>) -> Result<Response<HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health()))
    }

    async fn model_info(&self, _req: Request<()>) -> Result<Response<ModelInfoRes>, Status> {
        let info = self
            .pipeline
            .model_info()
            .ok_or_else(|| Status::unavailable("Model metadata unavailable"))?;
        Ok(Response::new(convert::model_info_response(info)))
    }

    async fn predict(&self, req: Request<PredictReq>) -> Result<Response<PredictRes>, Status> {
        let survey = convert::survey_from_request(req.into_inner());
        match self.pipeline.predict(&survey) {
            Ok(report) => Ok(Response::new(convert::predict_response(&report))),
            Err(e) => {
                if e.is_validation() {
                    tracing::warn!("Rejected survey: {}", e);
                } else {
                    tracing::error!("Predict error: {:?}", e);
                }
                Err(status_from_error(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyco_core::{Classifier, CoreConfig, CoreResult, FeatureVector, SurveyResponse};
    use std::sync::Arc;

    struct FixedClassifier(i64);

    impl Classifier for FixedClassifier {
        fn predict(&self, _features: &FeatureVector) -> CoreResult<i64> {
            Ok(self.0)
        }
    }

    fn service(value: i64) -> GlycoService {
        let cfg = Arc::new(CoreConfig::new("model.json".into(), false).expect("valid config"));
        GlycoService::new(SurveyPipeline::with_classifier(
            cfg,
            Arc::new(FixedClassifier(value)),
        ))
    }

    fn default_request() -> PredictReq {
        convert::request_from_survey(SurveyResponse::form_defaults())
    }

    #[tokio::test]
    async fn test_health() {
        let res = service(0)
            .health(Request::new(()))
            .await
            .expect("health should succeed")
            .into_inner();
        assert!(res.ok);
    }

    #[tokio::test]
    async fn test_predict_returns_report() {
        let res = service(2)
            .predict(Request::new(default_request()))
            .await
            .expect("predict should succeed")
            .into_inner();

        assert_eq!(res.predicted_class, "Diabetes");
        assert_eq!(res.class_colour, "red");
        assert!(!res.prediction_id.is_empty());
        assert!(!res.disclaimer.is_empty());
    }

    #[tokio::test]
    async fn test_predict_invalid_answers_is_invalid_argument() {
        let mut req = default_request();
        req.height_cm = -170.0;

        let status = service(0)
            .predict(Request::new(req))
            .await
            .expect_err("negative height should fail");
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("height_cm"));
    }

    #[tokio::test]
    async fn test_predict_unknown_label_is_internal() {
        let status = service(3)
            .predict(Request::new(default_request()))
            .await
            .expect_err("class 3 is unknown");
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[tokio::test]
    async fn test_model_info_without_artifact_is_unavailable() {
        let status = service(0)
            .model_info(Request::new(()))
            .await
            .expect_err("stub classifier has no metadata");
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }

    #[test]
    fn test_auth_interceptor_rejects_missing_key() {
        let status = auth_interceptor(Request::new(())).expect_err("no key supplied");
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }
}
