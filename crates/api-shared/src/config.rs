//! Startup configuration read from the process environment.
//!
//! Only server entry points call into this module. Handlers receive the resulting
//! [`CoreConfig`] through application state.

use glyco_core::config::{flag_from_env_value, resolve_model_path};
use glyco_core::{CoreConfig, CoreResult};
use std::path::PathBuf;

/// Path of the classifier artifact. Falls back to `model/model.json` lookup when unset.
pub const MODEL_PATH_ENV: &str = "GLYCO_MODEL_PATH";
/// When true, an artifact without a `.sha256` sidecar is refused.
pub const REQUIRE_CHECKSUM_ENV: &str = "GLYCO_REQUIRE_CHECKSUM";
/// gRPC bind address.
pub const GRPC_ADDR_ENV: &str = "GLYCO_ADDR";
/// REST bind address.
pub const REST_ADDR_ENV: &str = "GLYCO_REST_ADDR";
/// Enables gRPC server reflection when true.
pub const ENABLE_REFLECTION_ENV: &str = "GLYCO_ENABLE_REFLECTION";

pub const DEFAULT_GRPC_ADDR: &str = "0.0.0.0:50051";
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Builds the [`CoreConfig`] from `GLYCO_MODEL_PATH` and `GLYCO_REQUIRE_CHECKSUM`.
///
/// # Errors
///
/// Returns `CoreError::ArtifactUnavailable` if no artifact path can be resolved, or
/// `CoreError::Validation` if the checksum flag is not a boolean.
pub fn core_config_from_env() -> CoreResult<CoreConfig> {
    let model_path = resolve_model_path(std::env::var(MODEL_PATH_ENV).ok().map(PathBuf::from))?;
    let require_checksum = flag_from_env_value(std::env::var(REQUIRE_CHECKSUM_ENV).ok(), false)?;
    CoreConfig::new(model_path, require_checksum)
}

/// Reads the reflection flag, defaulting to disabled.
pub fn reflection_enabled() -> CoreResult<bool> {
    flag_from_env_value(std::env::var(ENABLE_REFLECTION_ENV).ok(), false)
}
