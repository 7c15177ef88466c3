use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Classifier;

/// Per-column centring applied before the linear layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Standardizer {
    fn apply(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogisticError {
    #[error("model needs at least one feature and two classes")]
    Shape,
    #[error("expected {expected} coefficient rows, found {actual}")]
    Rows { expected: usize, actual: usize },
    #[error("coefficient row {row} has {actual} weights, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("expected {expected} intercepts, found {actual}")]
    Intercepts { expected: usize, actual: usize },
    #[error("standardizer does not cover {expected} features")]
    Standardizer { expected: usize },
    #[error("parameters must be finite and scales non-zero")]
    NonFinite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLogistic {
    name: String,
    n_features: usize,
    n_classes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    standardizer: Option<Standardizer>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// Multinomial logistic regression.
///
/// A binary model stores a single coefficient row scoring the positive class;
/// with three or more classes there is one row per class and a softmax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogistic", into = "RawLogistic")]
pub struct LogisticModel {
    name: String,
    n_features: usize,
    n_classes: usize,
    standardizer: Option<Standardizer>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LogisticModel {
    pub fn new(
        name: impl Into<String>,
        n_features: usize,
        n_classes: usize,
        standardizer: Option<Standardizer>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, LogisticError> {
        if n_features == 0 || n_classes < 2 {
            return Err(LogisticError::Shape);
        }

        let rows = if n_classes == 2 { 1 } else { n_classes };
        if coefficients.len() != rows {
            return Err(LogisticError::Rows {
                expected: rows,
                actual: coefficients.len(),
            });
        }
        if let Some((row, weights)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, weights)| weights.len() != n_features)
        {
            return Err(LogisticError::RowWidth {
                row,
                expected: n_features,
                actual: weights.len(),
            });
        }
        if intercepts.len() != rows {
            return Err(LogisticError::Intercepts {
                expected: rows,
                actual: intercepts.len(),
            });
        }

        let finite = coefficients.iter().flatten().chain(&intercepts).all(|v| v.is_finite());
        if !finite {
            return Err(LogisticError::NonFinite);
        }

        if let Some(standardizer) = &standardizer {
            if standardizer.mean.len() != n_features || standardizer.scale.len() != n_features {
                return Err(LogisticError::Standardizer {
                    expected: n_features,
                });
            }
            let usable = standardizer.mean.iter().all(|m| m.is_finite())
                && standardizer
                    .scale
                    .iter()
                    .all(|s| s.is_finite() && *s != 0.0);
            if !usable {
                return Err(LogisticError::NonFinite);
            }
        }

        Ok(Self {
            name: name.into(),
            n_features,
            n_classes,
            standardizer,
            coefficients,
            intercepts,
        })
    }

    fn logits(&self, features: &[f64]) -> Vec<f64> {
        let scaled = match &self.standardizer {
            Some(standardizer) => standardizer.apply(features),
            None => features.to_vec(),
        };
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(weights, intercept)| {
                intercept + weights.iter().zip(&scaled).map(|(w, x)| w * x).sum::<f64>()
            })
            .collect()
    }
}

impl TryFrom<RawLogistic> for LogisticModel {
    type Error = LogisticError;

    fn try_from(raw: RawLogistic) -> Result<Self, Self::Error> {
        Self::new(
            raw.name,
            raw.n_features,
            raw.n_classes,
            raw.standardizer,
            raw.coefficients,
            raw.intercepts,
        )
    }
}

impl From<LogisticModel> for RawLogistic {
    fn from(model: LogisticModel) -> Self {
        Self {
            name: model.name,
            n_features: model.n_features,
            n_classes: model.n_classes,
            standardizer: model.standardizer,
            coefficients: model.coefficients,
            intercepts: model.intercepts,
        }
    }
}

impl Classifier for LogisticModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_probability(&self, features: &[f64]) -> Vec<f64> {
        let logits = self.logits(features);
        if self.n_classes == 2 {
            let positive = sigmoid(logits[0]);
            return vec![1.0 - positive, positive];
        }
        softmax(&logits)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = logits.iter().map(|z| (z - max).exp()).collect::<Vec<_>>();
    let total = exps.iter().sum::<f64>();
    exps.into_iter().map(|e| e / total).collect()
}
