pub mod encoding;
pub mod error;
pub mod features;
pub mod fusion;
pub mod models;
pub mod recommendations;
pub mod rules;
pub mod schema;

#[cfg(test)]
mod test_support;

pub use encoding::{CategoricalEncoderRegistry, LabelTable};
pub use error::{ConfigError, RiskError};
pub use features::{AttritionFeatureVector, EncodedFeatureVector, FeatureVectorBuilder};
pub use fusion::FusionPolicy;
pub use models::*;
pub use recommendations::recommend;
pub use rules::{score_rules, RiskFactor, RuleHit, RuleScore};
pub use schema::CategoricalField;
