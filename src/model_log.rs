//! Logging a fitted model as a run artifact
//!
//! A logged model is a directory under the run's artifact root holding
//!
//! - `MLmodel`: YAML descriptor (flavors, signature, provenance)
//! - `model.json`: the serialized estimator

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::experiment::ArtifactRecord;
use crate::model::Classifier;
use crate::signature::{ModelSignature, SignatureDocument};
use crate::tracking::{ActiveRun, ArtifactFile, TrackingBackend};
use crate::{Error, Result};

/// Descriptor file name.
pub const MLMODEL_FILE: &str = "MLmodel";
/// Serialized estimator file name.
pub const MODEL_DATA_FILE: &str = "model.json";
/// Flavor key under which the estimator is described.
pub const FLAVOR: &str = "aprender_logistic_regression";

/// How one flavor loads the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorConfig {
    /// Serialization format of the data file.
    pub model_format: String,
    /// Data file relative to the model directory.
    pub data: String,
    /// Version of the crate that wrote the model.
    pub code_version: String,
}

/// Contents of an `MLmodel` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlModel {
    /// Artifact path of the model directory within the run.
    pub artifact_path: String,
    /// Flavors keyed by name.
    pub flavors: BTreeMap<String, FlavorConfig>,
    /// Unique model id.
    pub model_uuid: String,
    /// Run the model was logged under.
    pub run_id: String,
    /// Input/output signature.
    pub signature: SignatureDocument,
    /// Creation time, UTC.
    pub utc_time_created: String,
}

/// Result of [`log_model`].
#[derive(Debug, Clone)]
pub struct LoggedModel {
    /// The descriptor that was written.
    pub mlmodel: MlModel,
    /// One record per stored file.
    pub artifacts: Vec<ArtifactRecord>,
}

/// Store `model` under `artifact_path` in the run, with `signature`.
///
/// Writes `MLmodel` and `model.json`, then appends the descriptor to the
/// run's logged-model history.
///
/// # Errors
///
/// Returns `NotFitted` for an unfitted model, serialization errors, or the
/// backend error from storing the files.
pub fn log_model<B: TrackingBackend>(
    run: &mut ActiveRun<'_, B>,
    model: &Classifier,
    artifact_path: &str,
    signature: &ModelSignature,
) -> Result<LoggedModel> {
    if !model.is_fitted() {
        return Err(Error::NotFitted("log_model"));
    }

    let mut flavors = BTreeMap::new();
    flavors.insert(
        FLAVOR.to_string(),
        FlavorConfig {
            model_format: "json".to_string(),
            data: MODEL_DATA_FILE.to_string(),
            code_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    );
    let mlmodel = MlModel {
        artifact_path: artifact_path.to_string(),
        flavors,
        model_uuid: Uuid::new_v4().simple().to_string(),
        run_id: run.run_id().to_string(),
        signature: signature.to_document()?,
        utc_time_created: Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
    };

    let files = [
        ArtifactFile::new(MLMODEL_FILE, serde_yaml::to_string(&mlmodel)?.into_bytes()),
        ArtifactFile::new(MODEL_DATA_FILE, serde_json::to_vec_pretty(model)?),
    ];
    let artifacts = run.log_artifacts(artifact_path, &files)?;
    run.record_logged_model(&serde_json::to_string(&mlmodel)?)?;

    Ok(LoggedModel { mlmodel, artifacts })
}
