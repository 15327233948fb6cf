//! # lr-tracking: a tracked logistic-regression run
//!
//! Trains a logistic-regression classifier on a fixed six-sample dataset
//! and records the run in an MLflow-compatible tracking server: the
//! hyperparameters as params, the training accuracy as metric `score`,
//! and the fitted model (with an inferred input/output signature) as an
//! artifact.
//!
//! ## Layout
//!
//! - [`config`]: settings from the environment
//! - [`experiment`]: tracking records and the in-memory backend
//! - [`tracking`]: backend trait, MLflow REST client, run scope
//! - [`model`]: dataset and classifier
//! - [`signature`]: model signature inference
//! - [`model_log`]: model artifact layout
//! - [`pipeline`]: the end-to-end run
//!
//! ## Example Usage
//!
//! ```rust
//! use lr_tracking::config::Config;
//! use lr_tracking::experiment::ExperimentStore;
//! use lr_tracking::pipeline::train_and_log;
//! use lr_tracking::tracking::Tracker;
//!
//! let config = Config::from_lookup(|_| None);
//! let mut tracker = Tracker::new(ExperimentStore::new());
//! tracker.set_experiment(&config.experiment_name)?;
//!
//! let mut out = Vec::new();
//! let summary = train_and_log(&mut tracker, &config, &mut out)?;
//! assert!((0.0..=1.0).contains(&summary.score));
//! # Ok::<(), lr_tracking::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod model;
pub mod model_log;
pub mod pipeline;
pub mod signature;
pub mod tracking;

pub use error::{Error, Result};
