//! Experiment Record - named collection of runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Experiment Record represents a tracked experiment.
///
/// Runs are grouped under an experiment, which the tracking server
/// identifies by an opaque ID and users address by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: String,
    name: String,
    artifact_location: Option<String>,
    deleted: bool,
    created_at: DateTime<Utc>,
}

impl ExperimentRecord {
    /// Create a new active experiment record with the given ID and name.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::builder(experiment_id, name).build()
    }

    /// Create a builder for constructing an experiment record with optional fields.
    #[must_use]
    pub fn builder(
        experiment_id: impl Into<String>,
        name: impl Into<String>,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_id, name)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root artifact location for runs of this experiment, if known.
    #[must_use]
    pub fn artifact_location(&self) -> Option<&str> {
        self.artifact_location.as_deref()
    }

    /// Whether the experiment is in the deleted lifecycle stage.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    experiment_id: String,
    name: String,
    artifact_location: Option<String>,
    deleted: bool,
    created_at: DateTime<Utc>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            name: name.into(),
            artifact_location: None,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    /// Set the artifact root location.
    #[must_use]
    pub fn artifact_location(mut self, location: impl Into<String>) -> Self {
        self.artifact_location = Some(location.into());
        self
    }

    /// Mark the experiment as deleted.
    #[must_use]
    pub const fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// Set a custom creation timestamp (server supplied or testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ExperimentRecord`.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        ExperimentRecord {
            experiment_id: self.experiment_id,
            name: self.name,
            artifact_location: self.artifact_location,
            deleted: self.deleted,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_record_new() {
        let record = ExperimentRecord::new("7", "Guildford Models");
        assert_eq!(record.experiment_id(), "7");
        assert_eq!(record.name(), "Guildford Models");
        assert!(!record.is_deleted());
        assert!(record.artifact_location().is_none());
    }

    #[test]
    fn test_experiment_record_builder() {
        let record = ExperimentRecord::builder("7", "Guildford Models")
            .artifact_location("mlflow-artifacts:/7")
            .deleted(true)
            .build();

        assert_eq!(record.artifact_location(), Some("mlflow-artifacts:/7"));
        assert!(record.is_deleted());
    }
}
