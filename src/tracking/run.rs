//! Tracker context and scoped run guard

use tracing::{info, warn};

use super::{ArtifactFile, TrackingBackend};
use crate::experiment::{
    ArtifactRecord, ExperimentRecord, MetricRecord, ParamRecord, RunRecord, RunStatus,
};
use crate::{Error, Result};

/// Tracking context: a backend plus the active experiment.
///
/// Constructed once and passed by reference to whatever opens runs.
///
/// ## Example
///
/// ```rust
/// use lr_tracking::experiment::{ExperimentStore, RunStatus};
/// use lr_tracking::tracking::Tracker;
///
/// let mut tracker = Tracker::new(ExperimentStore::new());
/// tracker.set_experiment("Guildford Models")?;
///
/// let (_, run) = tracker.with_run("anom-demo", |run| {
///     run.log_metric("score", 0.5)?;
///     Ok(())
/// })?;
/// assert_eq!(run.status(), RunStatus::Success);
/// # Ok::<(), lr_tracking::Error>(())
/// ```
#[derive(Debug)]
pub struct Tracker<B: TrackingBackend> {
    backend: B,
    experiment: Option<ExperimentRecord>,
}

impl<B: TrackingBackend> Tracker<B> {
    /// Create a tracker with no active experiment.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            experiment: None,
        }
    }

    /// Make `name` the active experiment, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or refuses the experiment.
    pub fn set_experiment(&mut self, name: &str) -> Result<&ExperimentRecord> {
        let experiment = self.backend.get_or_create_experiment(name)?;
        info!(
            experiment_id = experiment.experiment_id(),
            name = experiment.name(),
            "active experiment set"
        );
        Ok(self.experiment.insert(experiment))
    }

    /// The active experiment, if one was set.
    #[must_use]
    pub const fn active_experiment(&self) -> Option<&ExperimentRecord> {
        self.experiment.as_ref()
    }

    /// Borrow the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the tracker, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Open a run in the active experiment.
    ///
    /// The returned guard finalizes the run as Failed if it is dropped
    /// without [`ActiveRun::finish`].
    ///
    /// # Errors
    ///
    /// Returns `NoActiveExperiment` if `set_experiment` was not called, or
    /// the backend error if the run cannot be created.
    pub fn start_run(&mut self, run_name: &str) -> Result<ActiveRun<'_, B>> {
        let experiment_id = self
            .experiment
            .as_ref()
            .ok_or(Error::NoActiveExperiment)?
            .experiment_id();
        let run = self.backend.create_run(experiment_id, run_name)?;
        info!(run_id = run.run_id(), run_name, "run started");
        Ok(ActiveRun {
            backend: &mut self.backend,
            run,
            finalized: false,
        })
    }

    /// Run `body` inside a run scope.
    ///
    /// The run is finalized Success when `body` returns `Ok` and Failed
    /// when it returns `Err` or panics. On `Err` the body's error is
    /// returned even if finalizing also fails.
    ///
    /// # Errors
    ///
    /// Returns the error from opening the run, from `body`, or from
    /// finalizing a successful run.
    pub fn with_run<T, F>(&mut self, run_name: &str, body: F) -> Result<(T, RunRecord)>
    where
        F: FnOnce(&mut ActiveRun<'_, B>) -> Result<T>,
    {
        let mut run = self.start_run(run_name)?;
        match body(&mut run) {
            Ok(value) => {
                let record = run.finish(RunStatus::Success)?;
                Ok((value, record))
            }
            Err(e) => {
                let run_id = run.run_id().to_string();
                if let Err(finish_err) = run.finish(RunStatus::Failed) {
                    warn!(%run_id, error = %finish_err, "could not mark run as failed");
                }
                Err(e)
            }
        }
    }
}

/// An open run. All log calls are attributed to it.
///
/// Finalization happens exactly once: through [`finish`](Self::finish), or
/// on drop (status Failed) when the scope is left any other way.
#[derive(Debug)]
pub struct ActiveRun<'a, B: TrackingBackend> {
    backend: &'a mut B,
    run: RunRecord,
    finalized: bool,
}

impl<B: TrackingBackend> ActiveRun<'_, B> {
    /// The run as created by the backend.
    #[must_use]
    pub const fn record(&self) -> &RunRecord {
        &self.run
    }

    /// The run identifier.
    #[must_use]
    pub fn run_id(&self) -> &str {
        self.run.run_id()
    }

    /// Log one input parameter.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub fn log_param(&mut self, key: &str, value: impl ToString) -> Result<()> {
        let param = ParamRecord::new(self.run.run_id(), key, value.to_string());
        self.backend.log_param(&param)
    }

    /// Log several parameters in order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first backend error.
    pub fn log_params<K, V, I>(&mut self, params: I) -> Result<()>
    where
        K: AsRef<str>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        params
            .into_iter()
            .try_for_each(|(key, value)| self.log_param(key.as_ref(), value))
    }

    /// Log a scalar metric at step 0.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub fn log_metric(&mut self, key: &str, value: f64) -> Result<MetricRecord> {
        self.log_metric_at_step(key, value, 0)
    }

    /// Log a scalar metric at `step`.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub fn log_metric_at_step(&mut self, key: &str, value: f64, step: u64) -> Result<MetricRecord> {
        let metric = MetricRecord::new(self.run.run_id(), key, step, value);
        self.backend.log_metric(&metric)?;
        info!(run_id = self.run.run_id(), key, value, step, "metric logged");
        Ok(metric)
    }

    /// Store files under `artifact_path` in the run's artifact root.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub fn log_artifacts(
        &mut self,
        artifact_path: &str,
        files: &[ArtifactFile],
    ) -> Result<Vec<ArtifactRecord>> {
        let records = self.backend.log_artifacts(&self.run, artifact_path, files)?;
        for record in &records {
            info!(
                run_id = self.run.run_id(),
                path = record.path(),
                bytes = record.size_bytes(),
                "artifact stored"
            );
        }
        Ok(records)
    }

    /// Append an MLmodel description to the run's logged-model history.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub fn record_logged_model(&mut self, model_json: &str) -> Result<()> {
        self.backend.record_logged_model(self.run.run_id(), model_json)
    }

    /// Finalize the run with `status`, consuming the guard.
    ///
    /// # Errors
    ///
    /// Returns the backend error. The run is not finalized again on drop.
    pub fn finish(mut self, status: RunStatus) -> Result<RunRecord> {
        self.finalize(status)
    }

    fn finalize(&mut self, status: RunStatus) -> Result<RunRecord> {
        self.finalized = true;
        let record = self.backend.finish_run(self.run.run_id(), status)?;
        if status == RunStatus::Success {
            info!(run_id = self.run.run_id(), ?status, "run finished");
        } else {
            warn!(run_id = self.run.run_id(), ?status, "run finished");
        }
        Ok(record)
    }
}

impl<B: TrackingBackend> Drop for ActiveRun<'_, B> {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        if let Err(e) = self.finalize(RunStatus::Failed) {
            warn!(run_id = self.run.run_id(), error = %e, "could not mark run as failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use super::*;
    use crate::experiment::ExperimentStore;

    fn tracker() -> Tracker<ExperimentStore> {
        let mut tracker = Tracker::new(ExperimentStore::new());
        tracker.set_experiment("Guildford Models").unwrap();
        tracker
    }

    #[test]
    fn test_start_run_requires_experiment() {
        let mut tracker = Tracker::new(ExperimentStore::new());
        let err = tracker.start_run("r").unwrap_err();
        assert!(matches!(err, Error::NoActiveExperiment));
        assert_eq!(tracker.backend().run_count(), 0);
    }

    #[test]
    fn test_with_run_success_finalizes_once() {
        let mut tracker = tracker();
        let (run_id, record) = tracker
            .with_run("ok", |run| {
                run.log_metric("score", 0.75)?;
                Ok(run.run_id().to_string())
            })
            .unwrap();

        assert_eq!(record.run_id(), run_id);
        assert_eq!(record.status(), RunStatus::Success);
        assert_eq!(tracker.backend().finalize_count(&run_id), 1);
    }

    #[test]
    fn test_with_run_error_marks_failed_and_returns_body_error() {
        let mut tracker = tracker();
        let mut seen = String::new();
        let err = tracker
            .with_run("bad", |run| -> Result<()> {
                seen = run.run_id().to_string();
                Err(Error::Fit("diverged".to_string()))
            })
            .unwrap_err();

        assert!(matches!(err, Error::Fit(msg) if msg == "diverged"));
        let store = tracker.backend();
        assert_eq!(store.get_run(&seen).unwrap().status(), RunStatus::Failed);
        assert_eq!(store.finalize_count(&seen), 1);
    }

    #[test]
    fn test_dropped_guard_marks_failed() {
        let mut tracker = tracker();
        let run_id = {
            let run = tracker.start_run("dropped").unwrap();
            run.run_id().to_string()
        };
        assert_eq!(
            tracker.backend().get_run(&run_id).unwrap().status(),
            RunStatus::Failed
        );
        assert_eq!(tracker.backend().finalize_count(&run_id), 1);
    }

    #[test]
    fn test_panic_in_body_marks_failed() {
        let mut tracker = tracker();
        let mut run_id = String::new();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            tracker.with_run("panics", |run| -> Result<()> {
                run_id = run.run_id().to_string();
                panic!("boom");
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(
            tracker.backend().get_run(&run_id).unwrap().status(),
            RunStatus::Failed
        );
        assert_eq!(tracker.backend().finalize_count(&run_id), 1);
    }

    #[test]
    fn test_into_backend_keeps_recorded_runs() {
        let mut tracker = tracker();
        let (run_id, _) = tracker
            .with_run("kept", |run| Ok(run.run_id().to_string()))
            .unwrap();

        let store = tracker.into_backend();
        assert_eq!(store.run_count(), 1);
        assert_eq!(store.get_run(&run_id).unwrap().status(), RunStatus::Success);
    }

    #[test]
    fn test_log_params_in_order() {
        let mut tracker = tracker();
        let (run_id, _) = tracker
            .with_run("params", |run| {
                run.log_params([("C", "1.0"), ("max_iter", "100")])?;
                Ok(run.run_id().to_string())
            })
            .unwrap();

        let params = tracker.backend().get_params_for_run(&run_id);
        let keys: Vec<&str> = params.iter().map(|p| p.key()).collect();
        assert_eq!(keys, ["C", "max_iter"]);
    }
}
