//! Experiment Tracking Records
//!
//! Plain data structures describing what a tracking backend stores, plus
//! an in-memory backend built on them.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< RunRecord (N)
//!                              │
//!                              ├──< ParamRecord (N)
//!                              ├──< MetricRecord (N) [time-series]
//!                              └──< ArtifactRecord (N) [sha256]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use lr_tracking::experiment::{ExperimentRecord, MetricRecord, RunRecord, RunStatus};
//!
//! let experiment = ExperimentRecord::new("0", "Guildford Models");
//!
//! let mut run = RunRecord::new("run-001", experiment.experiment_id());
//! run.start();
//!
//! let metric = MetricRecord::new(run.run_id(), "score", 0, 0.5);
//! assert_eq!(metric.key(), "score");
//!
//! run.complete(RunStatus::Success);
//! assert!(run.is_finalized());
//! ```

mod artifact_record;
mod experiment_record;
mod metric_record;
mod param_record;
mod run_record;
mod store;

pub use artifact_record::ArtifactRecord;
pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder};
pub use metric_record::MetricRecord;
pub use param_record::ParamRecord;
pub use run_record::{RunRecord, RunRecordBuilder, RunStatus};
pub use store::ExperimentStore;
