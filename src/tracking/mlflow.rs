//! MLflow REST API 2.0 client
//!
//! Blocking HTTP client for an MLflow tracking server. Endpoint strings are
//! taken as configured; `reqwest` reports malformed URLs when the first
//! request is built.

use std::fmt;
use std::fs;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ArtifactFile, ArtifactLocation, TrackingBackend};
use crate::experiment::{
    ArtifactRecord, ExperimentRecord, MetricRecord, ParamRecord, RunRecord, RunStatus,
};
use crate::{Error, Result};

const API_PREFIX: &str = "api/2.0/mlflow";
const ARTIFACT_PROXY_PREFIX: &str = "api/2.0/mlflow-artifacts/artifacts";
const RESOURCE_DOES_NOT_EXIST: &str = "RESOURCE_DOES_NOT_EXIST";

/// HTTP basic-auth credentials for the tracking server.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Get the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Client for an MLflow tracking server.
#[derive(Debug, Clone)]
pub struct MlflowClient {
    base_url: String,
    credentials: Option<Credentials>,
    http: Client,
}

impl MlflowClient {
    /// Create a client for the server at `tracking_uri`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed (TLS backend
    /// initialization).
    pub fn new(tracking_uri: &str, credentials: Option<Credentials>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("lr-tracking/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: tracking_uri.trim_end_matches('/').to_string(),
            credentials,
            http,
        })
    }

    /// Tracking server base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }

    fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = self.authorize(request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(response.json()?)
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        debug!(endpoint = path, "POST");
        self.send(self.http.post(self.endpoint(path)).json(body))
    }

    fn get_experiment_by_name(&self, name: &str) -> Result<ExperimentRecord> {
        debug!(endpoint = "experiments/get-by-name", "GET");
        let response: GetExperimentResponse = self.send(
            self.http
                .get(self.endpoint("experiments/get-by-name"))
                .query(&[("experiment_name", name)]),
        )?;
        Ok(response.experiment.into_record())
    }

    fn upload_proxied(&self, root: &str, path: &str, content: &[u8]) -> Result<()> {
        let url = if root.is_empty() {
            format!("{}/{ARTIFACT_PROXY_PREFIX}/{path}", self.base_url)
        } else {
            format!("{}/{ARTIFACT_PROXY_PREFIX}/{root}/{path}", self.base_url)
        };
        debug!(%url, bytes = content.len(), "PUT artifact");
        let _: IgnoredAny = self.send(
            self.http
                .put(url)
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(content.to_vec()),
        )?;
        Ok(())
    }
}

impl TrackingBackend for MlflowClient {
    fn get_or_create_experiment(&mut self, name: &str) -> Result<ExperimentRecord> {
        match self.get_experiment_by_name(name) {
            Ok(experiment) if experiment.is_deleted() => {
                Err(Error::DeletedExperiment(name.to_string()))
            }
            Ok(experiment) => Ok(experiment),
            Err(e) if e.api_error_code() == Some(RESOURCE_DOES_NOT_EXIST) => {
                let created: CreateExperimentResponse =
                    self.post("experiments/create", &CreateExperimentRequest { name })?;
                Ok(ExperimentRecord::new(created.experiment_id, name))
            }
            Err(e) => Err(e),
        }
    }

    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<RunRecord> {
        let mut tags = vec![
            Tag::new("mlflow.runName", run_name),
            Tag::new("mlflow.source.name", env!("CARGO_PKG_NAME")),
            Tag::new("mlflow.source.type", "LOCAL"),
        ];
        if let Some(c) = &self.credentials {
            tags.push(Tag::new("mlflow.user", c.username()));
        }

        let request = CreateRunRequest {
            experiment_id,
            run_name,
            start_time: Utc::now().timestamp_millis(),
            tags,
        };
        let response: RunResponse = self.post("runs/create", &request)?;
        Ok(response.run.info.into_record())
    }

    fn log_param(&mut self, param: &ParamRecord) -> Result<()> {
        let _: IgnoredAny = self.post(
            "runs/log-parameter",
            &LogParamRequest {
                run_id: param.run_id(),
                key: param.key(),
                value: param.value(),
            },
        )?;
        Ok(())
    }

    fn log_metric(&mut self, metric: &MetricRecord) -> Result<()> {
        let _: IgnoredAny = self.post(
            "runs/log-metric",
            &LogMetricRequest {
                run_id: metric.run_id(),
                key: metric.key(),
                value: metric.value(),
                timestamp: metric.timestamp().timestamp_millis(),
                step: metric.step(),
            },
        )?;
        Ok(())
    }

    fn log_artifacts(
        &mut self,
        run: &RunRecord,
        artifact_path: &str,
        files: &[ArtifactFile],
    ) -> Result<Vec<ArtifactRecord>> {
        let uri = run
            .artifact_uri()
            .ok_or_else(|| Error::UnsupportedArtifactUri(String::new()))?;
        let location = ArtifactLocation::parse(uri)?;

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let path = file.path_under(artifact_path);
            match &location {
                ArtifactLocation::Proxied(root) => {
                    self.upload_proxied(root, &path, file.content())?;
                }
                ArtifactLocation::Local(root) => {
                    let target = root.join(&path);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    debug!(
                        path = %target.display(),
                        bytes = file.content().len(),
                        "write artifact"
                    );
                    fs::write(&target, file.content())?;
                }
            }
            records.push(ArtifactRecord::from_content(run.run_id(), path, file.content()));
        }
        Ok(records)
    }

    fn record_logged_model(&mut self, run_id: &str, model_json: &str) -> Result<()> {
        let _: IgnoredAny = self.post("runs/log-model", &LogModelRequest { run_id, model_json })?;
        Ok(())
    }

    fn finish_run(&mut self, run_id: &str, status: RunStatus) -> Result<RunRecord> {
        let response: UpdateRunResponse = self.post(
            "runs/update",
            &UpdateRunRequest {
                run_id,
                status: status.as_mlflow(),
                end_time: Utc::now().timestamp_millis(),
            },
        )?;
        Ok(response.run_info.into_record())
    }
}

fn api_error(status: u16, body: &str) -> Error {
    let parsed: Option<ErrorResponse> = serde_json::from_str(body).ok();
    match parsed {
        Some(e) => Error::Api {
            status,
            error_code: e.error_code,
            message: e.message,
        },
        None => Error::Api {
            status,
            error_code: String::new(),
            message: body.trim().to_string(),
        },
    }
}

fn millis_to_utc(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

// Wire types

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: ExperimentWire,
}

#[derive(Debug, Deserialize)]
struct ExperimentWire {
    experiment_id: String,
    name: String,
    #[serde(default)]
    artifact_location: Option<String>,
    #[serde(default)]
    lifecycle_stage: Option<String>,
    #[serde(default)]
    creation_time: Option<i64>,
}

impl ExperimentWire {
    fn into_record(self) -> ExperimentRecord {
        let mut builder = ExperimentRecord::builder(self.experiment_id, self.name)
            .deleted(self.lifecycle_stage.as_deref() == Some("deleted"));
        if let Some(location) = self.artifact_location {
            builder = builder.artifact_location(location);
        }
        if let Some(created) = millis_to_utc(self.creation_time) {
            builder = builder.created_at(created);
        }
        builder.build()
    }
}

#[derive(Debug, Serialize)]
struct CreateExperimentRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Serialize)]
struct Tag<'a> {
    key: &'a str,
    value: &'a str,
}

impl<'a> Tag<'a> {
    const fn new(key: &'a str, value: &'a str) -> Self {
        Self { key, value }
    }
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    experiment_id: &'a str,
    run_name: &'a str,
    start_time: i64,
    tags: Vec<Tag<'a>>,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    run: RunWire,
}

#[derive(Debug, Deserialize)]
struct RunWire {
    info: RunInfoWire,
}

#[derive(Debug, Deserialize)]
struct RunInfoWire {
    #[serde(default)]
    run_id: Option<String>,
    // older servers only send the deprecated run_uuid
    #[serde(default)]
    run_uuid: Option<String>,
    experiment_id: String,
    #[serde(default)]
    run_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    start_time: Option<i64>,
    #[serde(default)]
    end_time: Option<i64>,
    #[serde(default)]
    artifact_uri: Option<String>,
}

impl RunInfoWire {
    fn into_record(self) -> RunRecord {
        let status = self
            .status
            .as_deref()
            .and_then(RunStatus::from_mlflow)
            .unwrap_or(RunStatus::Running);
        let run_id = self.run_id.or(self.run_uuid).unwrap_or_default();
        let mut builder = RunRecord::builder(run_id, self.experiment_id).status(status);
        if let Some(name) = self.run_name {
            builder = builder.run_name(name);
        }
        if let Some(uri) = self.artifact_uri {
            builder = builder.artifact_uri(uri);
        }
        if let Some(started) = millis_to_utc(self.start_time) {
            builder = builder.started_at(started);
        }
        if let Some(ended) = millis_to_utc(self.end_time) {
            builder = builder.ended_at(ended);
        }
        builder.build()
    }
}

#[derive(Debug, Serialize)]
struct LogParamRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct LogMetricRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: f64,
    timestamp: i64,
    step: u64,
}

#[derive(Debug, Serialize)]
struct LogModelRequest<'a> {
    run_id: &'a str,
    model_json: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRunRequest<'a> {
    run_id: &'a str,
    status: &'a str,
    end_time: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateRunResponse {
    run_info: RunInfoWire,
}
