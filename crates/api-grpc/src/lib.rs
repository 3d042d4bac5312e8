//! # API gRPC
//!
//! gRPC server implementation for Glyco.
//!
//! Handles:
//! - gRPC service setup and authentication
//! - Service implementations using `glyco-core` through the shared `SurveyPipeline`
//! - gRPC-specific concerns (interceptors, status mapping, tonic integration)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub use service::{auth_interceptor, pb, status_from_error, GlycoService};

pub mod service;
