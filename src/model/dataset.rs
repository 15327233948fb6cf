//! Labelled training data

use aprender::primitives::Matrix;

use crate::{Error, Result};

/// Single feature of the demo dataset.
pub const DEMO_FEATURES: [f32; 6] = [-2.0, -1.0, 0.0, 1.0, 2.0, 1.0];

/// Binary labels of the demo dataset.
pub const DEMO_LABELS: [usize; 6] = [0, 0, 1, 1, 1, 0];

/// Feature matrix with one binary label per row.
///
/// Construction guarantees `x.n_rows() == y.len()`, `y` in {0, 1} and
/// finite features.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Matrix<f32>,
    y: Vec<usize>,
}

impl Dataset {
    /// Pair row-major `features` (`n_features` per row) with labels.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the features do not split into one row per
    /// label, and `Fit` for labels other than 0 or 1 or non-finite features.
    pub fn new(features: Vec<f32>, n_features: usize, y: Vec<usize>) -> Result<Self> {
        if n_features == 0 || features.len() != n_features * y.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} feature values do not form {} rows of {n_features}",
                features.len(),
                y.len()
            )));
        }
        if let Some(bad) = y.iter().find(|&&label| label > 1) {
            return Err(Error::Fit(format!("labels must be 0 or 1, found {bad}")));
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(Error::Fit("input contains NaN or infinity".to_string()));
        }

        let x = Matrix::from_vec(y.len(), n_features, features)
            .map_err(|e| Error::ShapeMismatch(e.to_string()))?;
        Ok(Self { x, y })
    }

    /// Single-feature dataset, the `reshape(-1, 1)` of `values`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn column(values: &[f32], y: Vec<usize>) -> Result<Self> {
        Self::new(values.to_vec(), 1, y)
    }

    /// The fixed six-sample, one-feature dataset the binary trains on.
    ///
    /// # Errors
    ///
    /// Only if the matrix cannot be allocated with the demo shape.
    pub fn demo() -> Result<Self> {
        Self::column(&DEMO_FEATURES, DEMO_LABELS.to_vec())
    }

    /// Feature matrix.
    #[must_use]
    pub const fn x(&self) -> &Matrix<f32> {
        &self.x
    }

    /// Labels.
    #[must_use]
    pub fn y(&self) -> &[usize] {
        &self.y
    }

    /// Number of features per row.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.x.n_cols()
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Whether there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_invariant() {
        let data = Dataset::demo().unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(data.x().shape(), (6, 1));
        assert_eq!(data.n_features(), 1);
        assert!(data.y().iter().all(|&l| l == 0 || l == 1));
    }

    #[test]
    fn test_demo_rows_match_constants() {
        let data = Dataset::demo().unwrap();
        for (row, expected) in DEMO_FEATURES.iter().enumerate() {
            assert_eq!(data.x().get(row, 0).to_bits(), expected.to_bits());
        }
        assert_eq!(data.y(), DEMO_LABELS);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Dataset::column(&[1.0, 2.0], vec![0]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_zero_features_rejected() {
        let err = Dataset::new(Vec::new(), 0, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_non_binary_label_rejected() {
        let err = Dataset::column(&[1.0, 2.0], vec![0, 2]).unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = Dataset::column(&[1.0, f32::NAN], vec![0, 1]).unwrap_err();
        assert!(matches!(err, Error::Fit(_)));
    }

    #[test]
    fn test_two_features_row_major() {
        let data = Dataset::new(vec![1.0, 2.0, 3.0, 4.0], 2, vec![0, 1]).unwrap();
        assert_eq!(data.x().shape(), (2, 2));
        assert_eq!(data.x().get(1, 0).to_bits(), 3.0_f32.to_bits());
    }
}
