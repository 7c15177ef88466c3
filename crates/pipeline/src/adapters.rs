//! Contract-checking wrappers around the two injected classifiers.
//!
//! The adapters are the only place model outputs enter the domain. Anything
//! outside the declared label space or probability range becomes a
//! `ModelContractViolation` instead of a default.

use std::sync::Arc;

use burnwatch_core::schema::{ATTRITION_FEATURE_COUNT, BASE_FEATURE_COUNT};
use burnwatch_core::{
    AttritionFeatureVector, BurnoutTier, EncodedFeatureVector, RiskError,
};
use burnwatch_ml::{argmax, Classifier, RawAttribution};

const BURNOUT_CLASSES: usize = 3;
const ATTRITION_CLASSES: usize = 2;
const LEAVES_CLASS: usize = 1;

#[derive(Clone)]
pub struct BurnoutClassifier {
    model: Arc<dyn Classifier>,
}

impl BurnoutClassifier {
    pub fn new(model: Arc<dyn Classifier>) -> Result<Self, RiskError> {
        check_shape(model.as_ref(), BASE_FEATURE_COUNT, BURNOUT_CLASSES)?;
        Ok(Self { model })
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub fn predict(&self, features: &EncodedFeatureVector) -> Result<BurnoutTier, RiskError> {
        let distribution = checked_distribution(
            self.model.as_ref(),
            features.values(),
            BURNOUT_CLASSES,
        )?;
        let code = most_probable(self.model.as_ref(), &distribution)?;
        BurnoutTier::from_code(code).ok_or_else(|| {
            RiskError::contract(
                self.model.model_name(),
                format!("burnout label {code} is outside 0..=2"),
            )
        })
    }
}

#[derive(Clone)]
pub struct AttritionClassifier {
    model: Arc<dyn Classifier>,
}

impl AttritionClassifier {
    pub fn new(model: Arc<dyn Classifier>) -> Result<Self, RiskError> {
        check_shape(model.as_ref(), ATTRITION_FEATURE_COUNT, ATTRITION_CLASSES)?;
        Ok(Self { model })
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Raw class code: 0 stays, 1 leaves.
    pub fn predict(&self, features: &AttritionFeatureVector) -> Result<i64, RiskError> {
        let distribution = checked_distribution(
            self.model.as_ref(),
            features.values(),
            ATTRITION_CLASSES,
        )?;
        let code = most_probable(self.model.as_ref(), &distribution)?;
        if !(0..ATTRITION_CLASSES as i64).contains(&code) {
            return Err(RiskError::contract(
                self.model.model_name(),
                format!("attrition label {code} is outside 0..=1"),
            ));
        }
        Ok(code)
    }

    /// Probability of leaving, in [0, 1].
    pub fn predict_probability(&self, features: &AttritionFeatureVector) -> Result<f64, RiskError> {
        let distribution = checked_distribution(
            self.model.as_ref(),
            features.values(),
            ATTRITION_CLASSES,
        )?;
        Ok(distribution[LEAVES_CLASS])
    }

    /// Exact attribution of P(leaves) over the attrition features.
    pub fn explain(&self, features: &AttritionFeatureVector) -> Result<RawAttribution, RiskError> {
        let explainer = self
            .model
            .explainer()
            .ok_or_else(|| RiskError::ExplainerUnavailable {
                model: self.model.model_name().to_string(),
            })?;

        explainer
            .explain(features.values(), LEAVES_CLASS)
            .map_err(|err| RiskError::contract(self.model.model_name(), err.to_string()))
    }
}

/// Class distribution of exactly `classes` finite probabilities in [0, 1].
fn checked_distribution(
    model: &dyn Classifier,
    features: &[f64],
    classes: usize,
) -> Result<Vec<f64>, RiskError> {
    let distribution = model.predict_probability(features);
    if distribution.len() != classes {
        return Err(RiskError::contract(
            model.model_name(),
            format!(
                "expected {classes} class probabilities, got {}",
                distribution.len()
            ),
        ));
    }
    if let Some((class, p)) = distribution
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(*p))
    {
        return Err(RiskError::contract(
            model.model_name(),
            format!("probability {p} for class {class} is outside [0, 1]"),
        ));
    }
    Ok(distribution)
}

fn most_probable(model: &dyn Classifier, distribution: &[f64]) -> Result<i64, RiskError> {
    argmax(distribution)
        .map(|idx| idx as i64)
        .ok_or_else(|| RiskError::contract(model.model_name(), "class distribution has no maximum"))
}

fn check_shape(model: &dyn Classifier, features: usize, classes: usize) -> Result<(), RiskError> {
    if model.n_features() != features {
        return Err(RiskError::contract(
            model.model_name(),
            format!("expects {} features, schema has {features}", model.n_features()),
        ));
    }
    if model.n_classes() != classes {
        return Err(RiskError::contract(
            model.model_name(),
            format!("predicts {} classes, expected {classes}", model.n_classes()),
        ));
    }
    Ok(())
}
