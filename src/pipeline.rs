//! The tracked training run: fit, score, log.

use std::io::Write;

use tracing::info;

use crate::config::Config;
use crate::experiment::{MetricRecord, RunRecord};
use crate::model::{Classifier, Dataset};
use crate::model_log::{log_model, LoggedModel};
use crate::signature::{infer_signature, ModelSignature};
use crate::tracking::{TrackingBackend, Tracker};
use crate::Result;

/// Metric key of the training accuracy.
pub const SCORE_METRIC: &str = "score";

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The finalized run.
    pub run: RunRecord,
    /// Mean accuracy on the training data, widened from the library's `f32`.
    pub score: f64,
    /// The metric record that was logged for `score`.
    pub metric: MetricRecord,
    /// Signature attached to the logged model.
    pub signature: ModelSignature,
    /// The logged model artifact.
    pub model: LoggedModel,
}

impl RunSummary {
    /// Identifier of the run.
    #[must_use]
    pub fn run_id(&self) -> &str {
        self.run.run_id()
    }
}

/// Train on the demo dataset inside a run named `config.model_name` and
/// log params, the score metric and the model.
///
/// Writes `Score: <score>` to `out` once the score is known and
/// `Model saved in run <id>` after the model is stored. The tracker must
/// already have an active experiment.
///
/// The score is computed on the training data itself; it is a training
/// accuracy, not a generalization estimate.
///
/// # Errors
///
/// Any fitting, logging or output error aborts the run, which is then
/// finalized as Failed; the error is returned unchanged.
pub fn train_and_log<B, W>(
    tracker: &mut Tracker<B>,
    config: &Config,
    out: &mut W,
) -> Result<RunSummary>
where
    B: TrackingBackend,
    W: Write,
{
    let ((score, metric, signature, model), run) = tracker.with_run(&config.model_name, |run| {
        let data = Dataset::demo()?;
        let mut classifier = Classifier::new();
        classifier.fit(&data)?;
        info!(samples = data.len(), features = data.n_features(), "model fitted");
        run.log_params(classifier.params())?;

        let score = f64::from(classifier.score(data.x(), data.y())?);
        writeln!(out, "Score: {score}")?;
        let metric = run.log_metric(SCORE_METRIC, score)?;

        let predictions = classifier.predict(data.x())?;
        let signature = infer_signature(data.x(), predictions.as_slice());
        let model = log_model(run, &classifier, &config.artifact_path, &signature)?;
        writeln!(out, "Model saved in run {}", run.run_id())?;

        Ok((score, metric, signature, model))
    })?;

    Ok(RunSummary {
        run,
        score,
        metric,
        signature,
        model,
    })
}
