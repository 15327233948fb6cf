//! Toy classifier: labelled data and a binary logistic regression.
//!
//! Both sit on `aprender`: features are an `aprender::primitives::Matrix<f32>`
//! and the estimator is aprender's `LogisticRegression`.
//!
//! ```rust
//! use lr_tracking::model::{Classifier, Dataset};
//!
//! let data = Dataset::demo()?;
//! let mut model = Classifier::new();
//! model.fit(&data)?;
//! let score = model.score(data.x(), data.y())?;
//! assert!((0.0..=1.0).contains(&score));
//! # Ok::<(), lr_tracking::Error>(())
//! ```

mod classifier;
mod dataset;

pub use classifier::{Classifier, ClassifierParams};
pub use dataset::{Dataset, DEMO_FEATURES, DEMO_LABELS};
