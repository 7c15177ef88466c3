mod artifacts;
mod logistic;
mod shap;
mod tree;

use thiserror::Error;

pub use artifacts::{
    load_encoders, load_model, ModelArtifacts, ModelFile, ATTRITION_MODEL_FILE,
    BURNOUT_MODEL_FILE, LABEL_ENCODERS_FILE,
};
pub use logistic::{LogisticError, LogisticModel, Standardizer};
pub use tree::{DecisionTree, TreeEnsemble, TreeError, TreeNode};

/// A fitted classifier, whatever the model family behind it.
///
/// Callers pass feature slices of exactly `n_features()` values in the
/// training column order.
pub trait Classifier: Send + Sync {
    fn model_name(&self) -> &str;

    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Class distribution for one instance, indexed by class code.
    fn predict_probability(&self, features: &[f64]) -> Vec<f64>;

    /// Most probable class code; the first one wins a tie. `None` when the
    /// distribution is empty or holds a NaN.
    fn predict(&self, features: &[f64]) -> Option<i64> {
        argmax(&self.predict_probability(features)).map(|idx| idx as i64)
    }

    /// Exact per-feature attribution, when the model family supports it.
    fn explainer(&self) -> Option<&dyn Explainer> {
        None
    }
}

pub trait Explainer: Send + Sync {
    fn explain(&self, features: &[f64], class_index: usize)
        -> Result<RawAttribution, ExplainError>;
}

/// Contributions in feature order plus the expected model output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribution {
    pub baseline: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplainError {
    #[error("class {class} is outside 0..{n_classes}")]
    ClassOutOfRange { class: usize, n_classes: usize },
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// Index of the largest value, first one on a tie.
pub fn argmax(values: &[f64]) -> Option<usize> {
    if values.is_empty() || values.iter().any(|value| value.is_nan()) {
        return None;
    }
    let mut best = 0;
    for (idx, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = idx;
        }
    }
    Some(best)
}
