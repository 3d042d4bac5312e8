use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("model artifact unavailable (path: {path}): {reason}", path = path.display())]
    ArtifactUnavailable { path: PathBuf, reason: String },
    #[error("classifier returned unexpected class label {0}")]
    UnexpectedClassLabel(i64),
    #[error("prediction service has failed; construct a new instance to retry")]
    ServiceFailed,
    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("invalid dataset: {0}")]
    Dataset(String),
    #[error("training failed: {0}")]
    Training(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize artifact: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    /// Builds an [`CoreError::ArtifactUnavailable`] for `path`.
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CoreError::ArtifactUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true when the error was caused by the caller's input rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
