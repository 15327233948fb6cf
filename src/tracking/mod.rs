//! Tracking client
//!
//! [`TrackingBackend`] is the seam between the training flow and wherever
//! runs are recorded. [`MlflowClient`] speaks the MLflow REST API;
//! [`ExperimentStore`](crate::experiment::ExperimentStore) keeps everything
//! in memory.
//!
//! [`Tracker`] owns a backend plus the active experiment, and hands out
//! [`ActiveRun`] guards that always finalize their run.

mod artifact_location;
mod mlflow;
mod run;

pub use artifact_location::ArtifactLocation;
pub use mlflow::{Credentials, MlflowClient};
pub use run::{ActiveRun, Tracker};

use crate::experiment::{
    ArtifactRecord, ExperimentRecord, MetricRecord, ParamRecord, RunRecord, RunStatus,
};
use crate::Result;

/// A file to be stored under a run's artifact root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    name: String,
    content: Vec<u8>,
}

impl ArtifactFile {
    /// Create a file with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// File name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Path of this file when stored under `artifact_path`.
    #[must_use]
    pub fn path_under(&self, artifact_path: &str) -> String {
        let dir = artifact_path.trim_matches('/');
        if dir.is_empty() {
            self.name.clone()
        } else {
            format!("{dir}/{}", self.name)
        }
    }
}

/// Operations a tracking service must provide.
///
/// Every call blocks until the backend acknowledges it. [`ActiveRun`]
/// never writes to a run after finalizing it; backends that can tell
/// reject such writes as well.
pub trait TrackingBackend {
    /// Look up an experiment by name, creating it when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable, rejects the request, or
    /// the experiment is deleted.
    fn get_or_create_experiment(&mut self, name: &str) -> Result<ExperimentRecord>;

    /// Create a run in Running state under `experiment_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request.
    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<RunRecord>;

    /// Record an input parameter.
    ///
    /// # Errors
    ///
    /// Returns error if the run is unknown or finalized.
    fn log_param(&mut self, param: &ParamRecord) -> Result<()>;

    /// Record a metric data point.
    ///
    /// # Errors
    ///
    /// Returns error if the run is unknown or finalized.
    fn log_metric(&mut self, metric: &MetricRecord) -> Result<()>;

    /// Store `files` under `artifact_path` in the run's artifact root.
    ///
    /// # Errors
    ///
    /// Returns error if the artifact store is unsupported or the upload fails.
    fn log_artifacts(
        &mut self,
        run: &RunRecord,
        artifact_path: &str,
        files: &[ArtifactFile],
    ) -> Result<Vec<ArtifactRecord>>;

    /// Append an MLmodel description to the run's logged-model history.
    ///
    /// # Errors
    ///
    /// Returns error if the run is unknown or finalized.
    fn record_logged_model(&mut self, run_id: &str, model_json: &str) -> Result<()>;

    /// Move the run to a terminal `status` and stamp its end time.
    ///
    /// # Errors
    ///
    /// Returns error if the run is unknown or already finalized.
    fn finish_run(&mut self, run_id: &str, status: RunStatus) -> Result<RunRecord>;
}
