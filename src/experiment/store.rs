//! Experiment Store - in-memory tracking backend
//!
//! Keeps everything a tracking server would persist in plain collections.
//! Used for offline runs and as the test double for [`MlflowClient`].
//!
//! [`MlflowClient`]: crate::tracking::MlflowClient

use std::collections::HashMap;

use uuid::Uuid;

use super::{ArtifactRecord, ExperimentRecord, MetricRecord, ParamRecord, RunRecord, RunStatus};
use crate::tracking::{ArtifactFile, TrackingBackend};
use crate::{Error, Result};

/// In-memory store for experiment tracking data.
///
/// ## Design
///
/// Experiments and runs live in hash maps keyed by ID. Params, metrics and
/// artifacts are append-only vectors filtered on read. Every write checks
/// that the target run exists and is not finalized, and the store counts
/// how many times each run was finalized.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: HashMap<String, ExperimentRecord>,
    runs: HashMap<String, RunRecord>,
    params: Vec<ParamRecord>,
    metrics: Vec<MetricRecord>,
    artifacts: Vec<ArtifactRecord>,
    artifact_content: HashMap<(String, String), Vec<u8>>,
    logged_models: Vec<(String, String)>,
    finalize_counts: HashMap<String, u32>,
    next_experiment_id: u64,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty (no experiments, runs, or metrics).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty() && self.runs.is_empty() && self.metrics.is_empty()
    }

    /// Get the number of experiments in the store.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Get the number of runs in the store.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Get the number of metrics in the store.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    /// Add an experiment to the store.
    pub fn add_experiment(&mut self, experiment: ExperimentRecord) {
        self.experiments
            .insert(experiment.experiment_id().to_string(), experiment);
    }

    /// Get an experiment by ID.
    #[must_use]
    pub fn get_experiment(&self, experiment_id: &str) -> Option<&ExperimentRecord> {
        self.experiments.get(experiment_id)
    }

    /// Get an experiment by name.
    #[must_use]
    pub fn get_experiment_by_name(&self, name: &str) -> Option<&ExperimentRecord> {
        self.experiments.values().find(|e| e.name() == name)
    }

    /// Get a run by ID.
    #[must_use]
    pub fn get_run(&self, run_id: &str) -> Option<&RunRecord> {
        self.runs.get(run_id)
    }

    /// Get all runs for an experiment.
    #[must_use]
    pub fn get_runs_for_experiment(&self, experiment_id: &str) -> Vec<&RunRecord> {
        self.runs
            .values()
            .filter(|run| run.experiment_id() == experiment_id)
            .collect()
    }

    /// Get the params logged against a run, in logging order.
    #[must_use]
    pub fn get_params_for_run(&self, run_id: &str) -> Vec<&ParamRecord> {
        self.params.iter().filter(|p| p.run_id() == run_id).collect()
    }

    /// Get metrics for a specific run and key, ordered by step.
    #[must_use]
    pub fn get_metrics_for_run(&self, run_id: &str, key: &str) -> Vec<MetricRecord> {
        let mut metrics: Vec<MetricRecord> = self
            .metrics
            .iter()
            .filter(|m| m.run_id() == run_id && m.key() == key)
            .cloned()
            .collect();

        metrics.sort_by_key(MetricRecord::step);

        metrics
    }

    /// Get the artifacts logged against a run.
    #[must_use]
    pub fn get_artifacts_for_run(&self, run_id: &str) -> Vec<&ArtifactRecord> {
        self.artifacts
            .iter()
            .filter(|a| a.run_id() == run_id)
            .collect()
    }

    /// Get the stored bytes of one artifact.
    #[must_use]
    pub fn artifact_content(&self, run_id: &str, path: &str) -> Option<&[u8]> {
        self.artifact_content
            .get(&(run_id.to_string(), path.to_string()))
            .map(Vec::as_slice)
    }

    /// Get the logged-model history (MLmodel JSON documents) of a run.
    #[must_use]
    pub fn logged_models_for_run(&self, run_id: &str) -> Vec<&str> {
        self.logged_models
            .iter()
            .filter(|(id, _)| id == run_id)
            .map(|(_, json)| json.as_str())
            .collect()
    }

    /// How many times a run was finalized (0 while it is still open).
    #[must_use]
    pub fn finalize_count(&self, run_id: &str) -> u32 {
        self.finalize_counts.get(run_id).copied().unwrap_or(0)
    }

    /// Next numeric experiment ID not already taken.
    fn allocate_experiment_id(&mut self) -> String {
        loop {
            let id = self.next_experiment_id.to_string();
            self.next_experiment_id += 1;
            if !self.experiments.contains_key(&id) {
                return id;
            }
        }
    }

    fn writable_run(&self, run_id: &str) -> Result<&RunRecord> {
        let run = self
            .runs
            .get(run_id)
            .ok_or_else(|| Error::RunNotFound(run_id.to_string()))?;
        if run.is_finalized() {
            return Err(Error::RunSealed(run_id.to_string()));
        }
        Ok(run)
    }
}

impl TrackingBackend for ExperimentStore {
    fn get_or_create_experiment(&mut self, name: &str) -> Result<ExperimentRecord> {
        if let Some(existing) = self.get_experiment_by_name(name) {
            if existing.is_deleted() {
                return Err(Error::DeletedExperiment(name.to_string()));
            }
            return Ok(existing.clone());
        }

        let experiment_id = self.allocate_experiment_id();
        let experiment = ExperimentRecord::builder(experiment_id.as_str(), name)
            .artifact_location(format!("memory:/{experiment_id}"))
            .build();
        self.add_experiment(experiment.clone());
        Ok(experiment)
    }

    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<RunRecord> {
        let experiment = self
            .experiments
            .get(experiment_id)
            .ok_or_else(|| Error::Api {
                status: 404,
                error_code: "RESOURCE_DOES_NOT_EXIST".to_string(),
                message: format!("No Experiment with id={experiment_id} exists"),
            })?;

        let run_id = Uuid::new_v4().simple().to_string();
        let root = experiment.artifact_location().unwrap_or("memory:");
        let mut run = RunRecord::builder(run_id.as_str(), experiment_id)
            .run_name(run_name)
            .artifact_uri(format!("{root}/{run_id}/artifacts"))
            .build();
        run.start();

        self.runs.insert(run_id, run.clone());
        Ok(run)
    }

    fn log_param(&mut self, param: &ParamRecord) -> Result<()> {
        self.writable_run(param.run_id())?;
        self.params.push(param.clone());
        Ok(())
    }

    fn log_metric(&mut self, metric: &MetricRecord) -> Result<()> {
        self.writable_run(metric.run_id())?;
        self.metrics.push(metric.clone());
        Ok(())
    }

    fn log_artifacts(
        &mut self,
        run: &RunRecord,
        artifact_path: &str,
        files: &[ArtifactFile],
    ) -> Result<Vec<ArtifactRecord>> {
        self.writable_run(run.run_id())?;

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let path = file.path_under(artifact_path);
            let record = ArtifactRecord::from_content(run.run_id(), path.as_str(), file.content());
            self.artifact_content
                .insert((run.run_id().to_string(), path), file.content().to_vec());
            self.artifacts.push(record.clone());
            records.push(record);
        }
        Ok(records)
    }

    fn record_logged_model(&mut self, run_id: &str, model_json: &str) -> Result<()> {
        self.writable_run(run_id)?;
        self.logged_models
            .push((run_id.to_string(), model_json.to_string()));
        Ok(())
    }

    fn finish_run(&mut self, run_id: &str, status: RunStatus) -> Result<RunRecord> {
        self.writable_run(run_id)?;
        let run = self
            .runs
            .get_mut(run_id)
            .ok_or_else(|| Error::RunNotFound(run_id.to_string()))?;
        run.complete(status);
        *self.finalize_counts.entry(run_id.to_string()).or_insert(0) += 1;
        Ok(run.clone())
    }
}
