//! # Glyco Core
//!
//! Core logic for the Glyco diabetes risk survey service.
//!
//! This crate contains pure data operations:
//! - Survey answers and their closed vocabularies ([`survey`])
//! - Encoding answers into the classifier's 21-column feature vector ([`encoder`])
//! - Loading a trained classifier artifact and predicting with it ([`artifact`], [`prediction`])
//! - Report cards for a prediction ([`report`])
//! - The offline training pipeline ([`dataset`], [`training`])
//!
//! **No API concerns**: authentication, HTTP/gRPC servers, or service interfaces belong in
//! `api-grpc`, `api-rest`, or `api-shared`.

pub mod artifact;
pub mod bmi;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod features;
pub mod forest;
pub mod prediction;
pub mod report;
pub mod scaler;
pub mod survey;
pub mod training;
mod validation;

pub use artifact::{ClassifierArtifact, ModelInfo};
pub use bmi::{Bmi, BmiCategory};
pub use classifier::{Classifier, DiabetesClass};
pub use config::CoreConfig;
pub use encoder::FeatureEncoder;
pub use error::{CoreError, CoreResult};
pub use features::{Feature, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use prediction::{PredictionResult, PredictionService, Ready, ServiceState, Uninitialised};
pub use report::{Report, ReportRow, RiskColour};
pub use survey::SurveyResponse;
