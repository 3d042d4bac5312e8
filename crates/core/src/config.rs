//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handlers never read environment variables; they receive a
//! `CoreConfig` (or an artifact loaded from it) through application state.

use crate::constants::DEFAULT_MODEL_PATH;
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    model_path: PathBuf,
    require_checksum: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if `model_path` is empty.
    pub fn new(model_path: PathBuf, require_checksum: bool) -> CoreResult<Self> {
        if model_path.as_os_str().is_empty() {
            return Err(CoreError::Validation("model path cannot be empty".into()));
        }

        Ok(Self {
            model_path,
            require_checksum,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Whether a missing `<artifact>.sha256` sidecar should be treated as an error.
    pub fn require_checksum(&self) -> bool {
        self.require_checksum
    }
}

/// Resolve the model artifact path without reading environment variables.
///
/// If `override_path` is provided it is returned unchanged; whether it exists is checked when the
/// artifact is loaded. Otherwise this looks for `model/model.json` relative to the current working
/// directory and then walks up from `CARGO_MANIFEST_DIR`.
///
/// # Errors
///
/// Returns [`CoreError::ArtifactUnavailable`] if no default artifact can be found.
pub fn resolve_model_path(override_path: Option<PathBuf>) -> CoreResult<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    let cwd_relative = PathBuf::from(DEFAULT_MODEL_PATH);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_MODEL_PATH);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(CoreError::artifact(
        cwd_relative,
        "could not locate model/model.json; train one with `glyco train` or set GLYCO_MODEL_PATH",
    ))
}

/// Parse a boolean flag from an optional environment value.
///
/// `None`, empty and whitespace-only values yield `default`. Accepted spellings are
/// `true`/`false`, `1`/`0` and `yes`/`no` (case-insensitive).
///
/// # Errors
///
/// Returns [`CoreError::Validation`] for any other value.
pub fn flag_from_env_value(value: Option<String>, default: bool) -> CoreResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(CoreError::Validation(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}
