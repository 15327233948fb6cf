//! Run configuration resolved from the environment
//!
//! | Variable              | Default                 |
//! |-----------------------|-------------------------|
//! | `MLFLOW_TRACKING_URI` | `http://localhost:5000` |
//! | `EXPERIMENT_NAME`     | `Guildford Models`      |
//! | `MODEL_NAME`          | `anom-<random uuid>`    |
//! | `MLFLOW_USERNAME`     | `asalex`                |
//! | `MLFLOW_PASSWORD`     | `asalex`                |
//! | `ARTIFACT_PATH`       | `model`                 |
//!
//! Values are not validated; the tracking client decides what it accepts.

use std::fmt;

use uuid::Uuid;

use crate::tracking::Credentials;

/// Environment variable holding the tracking server URI.
pub const TRACKING_URI_VAR: &str = "MLFLOW_TRACKING_URI";
/// Environment variable holding the experiment name.
pub const EXPERIMENT_NAME_VAR: &str = "EXPERIMENT_NAME";
/// Environment variable holding the run/model name.
pub const MODEL_NAME_VAR: &str = "MODEL_NAME";
/// Environment variable holding the basic-auth username.
pub const USERNAME_VAR: &str = "MLFLOW_USERNAME";
/// Environment variable holding the basic-auth password.
pub const PASSWORD_VAR: &str = "MLFLOW_PASSWORD";
/// Environment variable holding the artifact path of the logged model.
pub const ARTIFACT_PATH_VAR: &str = "ARTIFACT_PATH";

const DEFAULT_TRACKING_URI: &str = "http://localhost:5000";
const DEFAULT_EXPERIMENT_NAME: &str = "Guildford Models";
const DEFAULT_USERNAME: &str = "asalex";
const DEFAULT_PASSWORD: &str = "asalex";
const DEFAULT_ARTIFACT_PATH: &str = "model";

/// Settings for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Tracking server URI.
    pub tracking_uri: String,
    /// Experiment the run is recorded under.
    pub experiment_name: String,
    /// Display name of the run.
    pub model_name: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Artifact path of the logged model within the run.
    pub artifact_path: String,
}

impl Config {
    /// Resolve from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` for each variable, falling back to defaults.
    ///
    /// A random model name is generated only when `MODEL_NAME` is unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        Self {
            tracking_uri: or_default(TRACKING_URI_VAR, DEFAULT_TRACKING_URI),
            experiment_name: or_default(EXPERIMENT_NAME_VAR, DEFAULT_EXPERIMENT_NAME),
            model_name: lookup(MODEL_NAME_VAR).unwrap_or_else(generate_model_name),
            username: or_default(USERNAME_VAR, DEFAULT_USERNAME),
            password: or_default(PASSWORD_VAR, DEFAULT_PASSWORD),
            artifact_path: or_default(ARTIFACT_PATH_VAR, DEFAULT_ARTIFACT_PATH),
        }
    }

    /// Credentials for the tracking client.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.as_str(), self.password.as_str())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tracking_uri", &self.tracking_uri)
            .field("experiment_name", &self.experiment_name)
            .field("model_name", &self.model_name)
            .field("username", &self.username)
            .field("password", &"***")
            .field("artifact_path", &self.artifact_path)
            .finish()
    }
}

/// Fresh `anom-<uuid v4>` run name.
#[must_use]
pub fn generate_model_name() -> String {
    format!("anom-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.tracking_uri, "http://localhost:5000");
        assert_eq!(config.experiment_name, "Guildford Models");
        assert_eq!(config.username, "asalex");
        assert_eq!(config.password, "asalex");
        assert_eq!(config.artifact_path, "model");
        assert!(config.model_name.starts_with("anom-"));
        assert_eq!(config.model_name.len(), "anom-".len() + 36);
    }

    #[test]
    fn test_overrides_pass_through_unvalidated() {
        let env: HashMap<&str, &str> = [
            (TRACKING_URI_VAR, "not a uri"),
            (EXPERIMENT_NAME_VAR, "Exp"),
            (MODEL_NAME_VAR, "fixed"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.tracking_uri, "not a uri");
        assert_eq!(config.experiment_name, "Exp");
        assert_eq!(config.model_name, "fixed");
        assert_eq!(config.username, "asalex");
    }

    #[test]
    fn test_generated_names_differ() {
        let a = Config::from_lookup(|_| None);
        let b = Config::from_lookup(|_| None);
        assert_ne!(a.model_name, b.model_name);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::from_lookup(|key| (key == PASSWORD_VAR).then(|| "s3cret".to_string()));
        assert!(!format!("{config:?}").contains("s3cret"));
        assert_eq!(config.credentials().username(), "asalex");
    }
}
