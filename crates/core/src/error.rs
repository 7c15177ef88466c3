use thiserror::Error;

/// Failures the risk pipeline can surface to its caller.
///
/// `Validation` and `UnknownCategory` are input problems the caller can
/// correct. The remaining variants point at the loaded artifacts and must
/// never be papered over with fallback values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("{field} = {value} is outside the allowed range {min}..={max}")]
    Validation {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("unknown {field} category `{label}`")]
    UnknownCategory { field: String, label: String },
    #[error("encoder registry does not match the feature schema: {0}")]
    EncoderSchemaMismatch(String),
    #[error("model `{model}` violated its output contract: {detail}")]
    ModelContractViolation { model: String, detail: String },
    #[error("attribution is not available for model `{model}`")]
    ExplainerUnavailable { model: String },
}

impl RiskError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::UnknownCategory { .. } => "unknown_category",
            Self::EncoderSchemaMismatch(_) => "encoder_schema_mismatch",
            Self::ModelContractViolation { .. } => "model_contract_violation",
            Self::ExplainerUnavailable { .. } => "explainer_unavailable",
        }
    }

    /// True when the request itself was at fault and resubmitting corrected
    /// input can succeed.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::UnknownCategory { .. })
    }

    pub fn contract(model: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ModelContractViolation {
            model: model.into(),
            detail: detail.into(),
        }
    }
}

/// Rejected runtime settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got `{value}`")]
    InvalidNumber { key: String, value: String },
    #[error("fusion weights must be finite, non-negative and sum to 1 (model {model}, rules {rules})")]
    InvalidWeights { model: f64, rules: f64 },
    #[error("tier thresholds must satisfy 0 <= medium < high <= 100 (medium {medium}, high {high})")]
    InvalidThresholds { medium: f64, high: f64 },
    #[error("attribution top-k must be at least 1")]
    InvalidTopK,
}
