use std::path::PathBuf;
use std::str::FromStr;

use burnwatch_core::{ConfigError, FusionPolicy};
use serde::Serialize;

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_TOP_K: usize = 5;

pub const MODEL_DIR_VAR: &str = "BURNWATCH_MODEL_DIR";
pub const MODEL_WEIGHT_VAR: &str = "BURNWATCH_MODEL_WEIGHT";
pub const RULE_WEIGHT_VAR: &str = "BURNWATCH_RULE_WEIGHT";
pub const HIGH_THRESHOLD_VAR: &str = "BURNWATCH_HIGH_THRESHOLD";
pub const MEDIUM_THRESHOLD_VAR: &str = "BURNWATCH_MEDIUM_THRESHOLD";
pub const TOP_K_VAR: &str = "BURNWATCH_ATTRIBUTION_TOP_K";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSettings {
    pub model_dir: PathBuf,
    pub fusion: FusionPolicy,
    pub attribution_top_k: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            fusion: FusionPolicy::default(),
            attribution_top_k: DEFAULT_TOP_K,
        }
    }
}

impl PipelineSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset keys keep their defaults and
    /// unparseable values are errors.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let model_dir = lookup(MODEL_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let fusion = FusionPolicy {
            model_weight: parse_or(&lookup, MODEL_WEIGHT_VAR, defaults.fusion.model_weight)?,
            rule_weight: parse_or(&lookup, RULE_WEIGHT_VAR, defaults.fusion.rule_weight)?,
            high_threshold: parse_or(&lookup, HIGH_THRESHOLD_VAR, defaults.fusion.high_threshold)?,
            medium_threshold: parse_or(
                &lookup,
                MEDIUM_THRESHOLD_VAR,
                defaults.fusion.medium_threshold,
            )?,
        };
        fusion.validate()?;

        let attribution_top_k = parse_or(&lookup, TOP_K_VAR, defaults.attribution_top_k)?;
        if attribution_top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }

        Ok(Self {
            model_dir,
            fusion,
            attribution_top_k,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value: raw,
            }),
    }
}
