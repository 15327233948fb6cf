//! Property-based tests for lr-tracking
//!
//! - Classifier outputs stay in range for arbitrary well-formed data
//! - Dataset validation accepts exactly the binary, length-matched inputs
//! - Signature shapes ignore the number of samples
//! - Run to ProptestConfig::with_cases(100)

use lr_tracking::config::Config;
use lr_tracking::model::{Classifier, Dataset};
use lr_tracking::signature::infer_signature;
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Single-feature dataset with both classes present.
fn arb_two_class_dataset() -> impl Strategy<Value = Dataset> {
    (2usize..40)
        .prop_flat_map(|n| {
            (
                proptest::collection::vec(-10.0f32..10.0, n),
                proptest::collection::vec(0usize..=1, n - 2),
            )
        })
        .prop_map(|(features, mut labels)| {
            // guarantee both classes
            labels.push(0);
            labels.push(1);
            Dataset::column(&features, labels).unwrap()
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: score is a fraction of samples in [0, 1]
    #[test]
    fn prop_score_in_unit_interval(data in arb_two_class_dataset()) {
        let mut model = Classifier::new();
        model.fit(&data).unwrap();
        let score = model.score(data.x(), data.y()).unwrap();
        prop_assert!((0.0..=1.0).contains(&score));
    }

    /// Property: probabilities are finite and in [0, 1]
    #[test]
    fn prop_probabilities_bounded(data in arb_two_class_dataset()) {
        let mut model = Classifier::new();
        model.fit(&data).unwrap();
        for p in model.predict_proba(data.x()).unwrap() {
            prop_assert!(p.is_finite());
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    /// Property: fitting is deterministic
    #[test]
    fn prop_fit_deterministic(data in arb_two_class_dataset()) {
        let mut a = Classifier::new();
        let mut b = Classifier::new();
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();
        prop_assert_eq!(a.predict_proba(data.x()).unwrap(), b.predict_proba(data.x()).unwrap());
    }

    /// Property: predictions are binary and one per row
    #[test]
    fn prop_predictions_binary(data in arb_two_class_dataset()) {
        let mut model = Classifier::new();
        model.fit(&data).unwrap();
        let predictions = model.predict(data.x()).unwrap();
        prop_assert_eq!(predictions.len(), data.len());
        prop_assert!(predictions.iter().all(|&p| p == 0 || p == 1));
    }

    /// Property: dataset construction rejects mismatched lengths
    #[test]
    fn prop_dataset_rejects_length_mismatch(rows in 0usize..20, labels in 0usize..20) {
        prop_assume!(rows != labels);
        prop_assert!(Dataset::column(&vec![0.0; rows], vec![0; labels]).is_err());
    }

    /// Property: dataset construction rejects labels outside {0, 1}
    #[test]
    fn prop_dataset_rejects_non_binary(label in 2usize..) {
        prop_assert!(Dataset::column(&[1.0, 2.0], vec![0, label]).is_err());
    }

    /// Property: signature shape does not depend on sample count
    #[test]
    fn prop_signature_batch_independent(rows in 1usize..50, cols in 1usize..5) {
        let data = Dataset::new(vec![0.0; rows * cols], cols, vec![0; rows]).unwrap();
        let signature = infer_signature(data.x(), data.y());
        let expected_cols = i64::try_from(cols).unwrap();
        prop_assert_eq!(
            signature.inputs().first_tensor().unwrap().shape(),
            &[-1, expected_cols][..]
        );
        prop_assert_eq!(signature.outputs().first_tensor().unwrap().shape(), &[-1][..]);
    }

    /// Property: explicit settings are used verbatim
    #[test]
    fn prop_config_passes_values_through(uri in ".*", name in ".+") {
        let config = Config::from_lookup(|key| match key {
            "MLFLOW_TRACKING_URI" => Some(uri.clone()),
            "MODEL_NAME" => Some(name.clone()),
            _ => None,
        });
        prop_assert_eq!(config.tracking_uri, uri);
        prop_assert_eq!(config.model_name, name);
    }
}
