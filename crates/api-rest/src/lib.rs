//! # API REST
//!
//! REST API implementation for Glyco.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - The browser survey form and report pages
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub mod html;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{convert, pb, HealthService, SurveyPipeline};
use glyco_core::CoreError;
use html::SurveyForm;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SurveyPipeline,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, model_info, predict),
    components(schemas(
        pb::HealthRes,
        pb::ModelInfoRes,
        pb::PredictReq,
        pb::PredictRes,
        pb::ReportRow,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router: JSON API, HTML pages and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(survey_form))
        .route("/report", post(report))
        .route("/health", get(health))
        .route("/model", get(model_info))
        .route("/predict", post(predict))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::ArtifactUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/model",
    responses(
        (status = 200, description = "Loaded model metadata", body = pb::ModelInfoRes),
        (status = 503, description = "No model metadata available")
    )
)]
/// Metadata of the loaded classifier artifact
///
/// # Errors
/// Returns `503 Service Unavailable` if the classifier was not loaded from an artifact.
#[axum::debug_handler]
async fn model_info(
    State(state): State<AppState>,
) -> Result<Json<pb::ModelInfoRes>, (StatusCode, &'static str)> {
    match state.pipeline.model_info() {
        Some(info) => Ok(Json(convert::model_info_response(info))),
        None => Err((StatusCode::SERVICE_UNAVAILABLE, "Model metadata unavailable")),
    }
}

#[utoipa::path(
    post,
    path = "/predict",
    request_body = pb::PredictReq,
    responses(
        (status = 200, description = "Prediction report", body = pb::PredictRes),
        (status = 400, description = "Invalid survey answers"),
        (status = 500, description = "Prediction failed")
    )
)]
/// Predict diabetes status from survey answers
///
/// Choice answers are the labels shown on the survey form (`"Yes"`, `"Very Good"`, ...).
///
/// # Errors
/// - `400 Bad Request` with the validation message if any answer is invalid
/// - `500 Internal Server Error` if the classifier fails or returns an unknown class
#[axum::debug_handler]
async fn predict(
    State(state): State<AppState>,
    Json(req): Json<pb::PredictReq>,
) -> Result<Json<pb::PredictRes>, (StatusCode, String)> {
    let survey = convert::survey_from_request(req);
    match state.pipeline.predict(&survey) {
        Ok(report) => Ok(Json(convert::predict_response(&report))),
        Err(e) if e.is_validation() => {
            tracing::warn!("Rejected survey: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Predict error: {:?}", e);
            Err((status_for(&e), "Prediction failed".to_string()))
        }
    }
}

/// Survey form page.
async fn survey_form() -> Html<String> {
    Html(html::survey_form_page())
}

/// Report page for a submitted survey form.
async fn report(
    State(state): State<AppState>,
    Form(form): Form<SurveyForm>,
) -> (StatusCode, Html<String>) {
    let survey = match form.into_survey() {
        Ok(survey) => survey,
        Err(message) => return (StatusCode::BAD_REQUEST, Html(html::error_page(&message))),
    };

    match state.pipeline.predict(&survey) {
        Ok(report) => (StatusCode::OK, Html(html::report_page(&report))),
        Err(e) if e.is_validation() => {
            tracing::warn!("Rejected survey form: {}", e);
            (StatusCode::BAD_REQUEST, Html(html::error_page(&e.to_string())))
        }
        Err(e) => {
            tracing::error!("Report error: {:?}", e);
            (
                status_for(&e),
                Html(html::error_page(
                    "The prediction could not be made. Please try again later.",
                )),
            )
        }
    }
}
