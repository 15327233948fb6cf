//! Error types for lr-tracking
//!
//! Faults from the HTTP client, filesystem and serializers are wrapped
//! unmodified; the remaining variants describe model fitting and run
//! lifecycle violations.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// lr-tracking error types
#[derive(Error, Debug)]
pub enum Error {
    /// Tracking server answered with a non-success status
    #[error("Tracking API error ({status}) {error_code}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// MLflow error code (e.g. `RESOURCE_DOES_NOT_EXIST`)
        error_code: String,
        /// Server supplied message
        message: String,
    },

    /// Experiment exists but is in the deleted lifecycle stage
    #[error(
        "Cannot set a deleted experiment '{0}' as the active experiment\n\
         Restore it or choose another EXPERIMENT_NAME"
    )]
    DeletedExperiment(String),

    /// A run was requested before an experiment was set
    #[error("No active experiment: call set_experiment before starting a run")]
    NoActiveExperiment,

    /// Run not known to the backend
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// Log call against a run that has already been finalized
    #[error("Run {0} is finalized and can no longer be modified")]
    RunSealed(String),

    /// Artifact URI scheme the client cannot write to
    #[error("Unsupported artifact URI: {0}\nExpected mlflow-artifacts:/, file:// or a local path")]
    UnsupportedArtifactUri(String),

    /// Input shapes disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Model fitting failed
    #[error("Model fitting failed: {0}")]
    Fit(String),

    /// Model used before `fit`
    #[error("Model is not fitted yet: call fit before {0}")]
    NotFitted(&'static str),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// MLflow error code, if this is an API error.
    #[must_use]
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { error_code, .. } => Some(error_code),
            _ => None,
        }
    }
}
