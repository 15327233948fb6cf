//! Binary classifier backed by `aprender`'s logistic regression
//!
//! The estimator itself (gradient descent on the binary cross-entropy) is
//! aprender's; this wrapper pins the hyperparameters so they can be logged,
//! checks inputs against the fitted feature count and turns library faults
//! into crate errors.

use aprender::metrics::classification::accuracy;
use aprender::prelude::{LogisticRegression, Matrix};
use serde::{Deserialize, Serialize};

use super::Dataset;
use crate::{Error, Result};

/// Hyperparameters of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Gradient-descent step size.
    pub learning_rate: f32,
    /// Iteration cap.
    pub max_iter: usize,
    /// Convergence tolerance.
    pub tolerance: f32,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }
}

/// Logistic-regression classifier over `f32` features and `{0, 1}` labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    params: ClassifierParams,
    model: LogisticRegression,
    n_features: Option<usize>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_params(ClassifierParams::default())
    }
}

impl Classifier {
    /// Unfitted classifier with default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unfitted classifier with the given hyperparameters.
    #[must_use]
    pub fn with_params(params: ClassifierParams) -> Self {
        let model = LogisticRegression::new()
            .with_learning_rate(params.learning_rate)
            .with_max_iter(params.max_iter)
            .with_tolerance(params.tolerance);
        Self {
            params,
            model,
            n_features: None,
        }
    }

    /// Hyperparameters in effect.
    #[must_use]
    pub const fn hyperparameters(&self) -> ClassifierParams {
        self.params
    }

    /// Hyperparameters as `(name, value)` pairs, suitable for run params.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("learning_rate", self.params.learning_rate.to_string()),
            ("max_iter", self.params.max_iter.to_string()),
            ("solver", "gradient_descent".to_string()),
            ("tolerance", self.params.tolerance.to_string()),
        ]
    }

    /// Whether `fit` has completed.
    #[must_use]
    pub const fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    /// Fit to `data`.
    ///
    /// # Errors
    ///
    /// Returns `Fit` for empty or single-class data, or when the library
    /// rejects the fit.
    pub fn fit(&mut self, data: &Dataset) -> Result<()> {
        let Some(&first) = data.y().first() else {
            return Err(Error::Fit("no samples to fit".to_string()));
        };
        if data.y().iter().all(|&label| label == first) {
            return Err(Error::Fit(format!(
                "needs samples of at least 2 classes, but the data contains only class {first}"
            )));
        }

        self.model
            .fit(data.x(), data.y())
            .map_err(|e| Error::Fit(e.to_string()))?;
        self.n_features = Some(data.n_features());
        Ok(())
    }

    /// Probability of class 1 for each row.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, `ShapeMismatch` on a wrong feature count.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<f32>> {
        self.check_input(x, "predict_proba")?;
        Ok(self.model.predict_proba(x).as_slice().to_vec())
    }

    /// Predicted class for each row.
    ///
    /// # Errors
    ///
    /// Same as [`predict_proba`](Self::predict_proba).
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        self.check_input(x, "predict")?;
        Ok(self.model.predict(x))
    }

    /// Mean accuracy of `predict(x)` against `y`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` unless `y` has one label per row (and at least
    /// one), plus the errors of [`predict`](Self::predict).
    pub fn score(&self, x: &Matrix<f32>, y: &[usize]) -> Result<f32> {
        if x.n_rows() != y.len() || y.is_empty() {
            return Err(Error::ShapeMismatch(format!(
                "X has {} rows but y has {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        let predictions = self.predict(x)?;
        Ok(accuracy(&predictions, y))
    }

    fn check_input(&self, x: &Matrix<f32>, operation: &'static str) -> Result<()> {
        let expected = self.n_features.ok_or(Error::NotFitted(operation))?;
        if x.n_cols() != expected {
            return Err(Error::ShapeMismatch(format!(
                "X has {} features, model expects {expected}",
                x.n_cols()
            )));
        }
        Ok(())
    }
}
