//! # API Shared
//!
//! Shared utilities and definitions for Glyco APIs.
//!
//! Contains:
//! - Protobuf-generated types (`pb` module)
//! - Shared services like `HealthService` and the `SurveyPipeline`
//! - Conversions between protobuf messages and core types
//! - Authentication utilities (usable by both gRPC and REST)
//!
//! Used by `api-grpc` and `api-rest` for common functionality.

// Re-export the generated protobuf module. The generated code will be placed
// into OUT_DIR at build time by the build script.
pub mod pb {
    tonic::include_proto!("glyco.v1");
}

pub mod auth;
pub mod config;
pub mod convert;
pub mod health;
pub mod pipeline;

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("proto_descriptor");

pub use health::HealthService;
pub use pb::*;
pub use pipeline::SurveyPipeline;
