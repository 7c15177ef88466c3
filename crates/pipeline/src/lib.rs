pub mod adapters;
pub mod attribution;
pub mod settings;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use burnwatch_core::{
    recommend, score_rules, Attribution, AttritionFeatureVector, CategoricalEncoderRegistry,
    FeatureVectorBuilder, InputRecord, ModelProvenance, ModelScore, PredictionResult, RiskError,
};
use burnwatch_ml::{Classifier, ModelArtifacts};
use burnwatch_observability::AppMetrics;
use tracing::{error, info, instrument, warn};

pub use adapters::{AttritionClassifier, BurnoutClassifier};
pub use settings::PipelineSettings;

/// Hybrid burnout/attrition assessment over injected classifiers.
///
/// Holds only shared read-only state, so one instance serves any number of
/// concurrent callers.
#[derive(Clone)]
pub struct RiskPipeline {
    burnout: BurnoutClassifier,
    attrition: AttritionClassifier,
    encoders: Arc<CategoricalEncoderRegistry>,
    settings: PipelineSettings,
    metrics: Arc<AppMetrics>,
}

impl RiskPipeline {
    pub fn new(
        burnout: Arc<dyn Classifier>,
        attrition: Arc<dyn Classifier>,
        encoders: Arc<CategoricalEncoderRegistry>,
        settings: PipelineSettings,
        metrics: Arc<AppMetrics>,
    ) -> Result<Self, RiskError> {
        Ok(Self {
            burnout: BurnoutClassifier::new(burnout)?,
            attrition: AttritionClassifier::new(attrition)?,
            encoders,
            settings,
            metrics,
        })
    }

    pub fn from_artifacts(
        artifacts: ModelArtifacts,
        settings: PipelineSettings,
        metrics: Arc<AppMetrics>,
    ) -> Result<Self, RiskError> {
        Self::new(
            artifacts.burnout,
            artifacts.attrition,
            artifacts.encoders,
            settings,
            metrics,
        )
    }

    /// Loads the artifacts named by `settings.model_dir` and wires them up.
    pub fn load(settings: PipelineSettings, metrics: Arc<AppMetrics>) -> Result<Self> {
        let artifacts = ModelArtifacts::load_dir(&settings.model_dir).with_context(|| {
            format!(
                "failed loading model artifacts from {}",
                settings.model_dir.display()
            )
        })?;
        let pipeline = Self::from_artifacts(artifacts, settings, metrics)
            .context("model artifacts do not match the feature schema")?;

        info!(
            burnout_model = pipeline.burnout.model_name(),
            attrition_model = pipeline.attrition.model_name(),
            "risk pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn encoders(&self) -> &CategoricalEncoderRegistry {
        &self.encoders
    }

    pub fn provenance(&self) -> ModelProvenance {
        ModelProvenance {
            burnout_model: self.burnout.model_name().to_string(),
            attrition_model: self.attrition.model_name().to_string(),
        }
    }

    /// Scores one employee record end to end.
    ///
    /// Input problems are reported before either classifier runs. A missing
    /// explainer only drops the attribution; every other failure aborts the
    /// request without a partial result.
    #[instrument(skip(self, record), fields(job_role = %record.job_role))]
    pub fn predict_risk(&self, record: &InputRecord) -> Result<PredictionResult, RiskError> {
        let started = Instant::now();

        match self.assess(record) {
            Ok(result) => {
                self.metrics
                    .record_prediction(result.tier.as_str(), started.elapsed());
                info!(
                    tier = %result.tier,
                    final_risk = result.final_risk,
                    burnout_tier = result.burnout_tier.label(),
                    rule_score = result.rule_score,
                    "risk assessed"
                );
                Ok(result)
            }
            Err(err) => {
                self.observe_failure(&err);
                Err(err)
            }
        }
    }

    /// Full, untruncated attribution of the attrition probability.
    #[instrument(skip(self, record))]
    pub fn explain(&self, record: &InputRecord) -> Result<Attribution, RiskError> {
        let outcome = self.score_models(record).and_then(|(features, probability)| {
            self.attribute(&features, probability)
        });
        if let Err(err) = &outcome {
            self.observe_failure(err);
        }
        outcome
    }

    fn assess(&self, record: &InputRecord) -> Result<PredictionResult, RiskError> {
        let (features, probability) = self.score_models(record)?;
        let model = ModelScore {
            burnout_tier: features.burnout_tier(),
            attrition_probability: probability * 100.0,
        };

        let rules = score_rules(record);
        let assessment = self.settings.fusion.assess(&model, &rules);

        let attribution = match self.attribute(&features, probability) {
            Ok(full) => Some(full.top(self.settings.attribution_top_k)),
            Err(RiskError::ExplainerUnavailable { model }) => {
                warn!(model = %model, "attribution unavailable; returning result without it");
                self.metrics.inc_explainer_unavailable();
                None
            }
            Err(err) => return Err(err),
        };

        Ok(PredictionResult {
            burnout_tier: assessment.burnout_tier,
            attrition_probability: model.attrition_probability,
            rule_score: rules.total,
            rule_hits: rules.hits,
            final_risk: assessment.final_risk_percent,
            tier: assessment.tier,
            attribution,
            recommendations: recommend(assessment.tier, record),
            models: self.provenance(),
        })
    }

    /// Validate, encode, burnout, then attrition with the burnout code.
    fn score_models(
        &self,
        record: &InputRecord,
    ) -> Result<(AttritionFeatureVector, f64), RiskError> {
        let features = FeatureVectorBuilder::new(&self.encoders).build(record)?;
        let burnout_tier = self.burnout.predict(&features)?;
        let attrition_features = features.with_burnout(burnout_tier);
        let probability = self.attrition.predict_probability(&attrition_features)?;
        Ok((attrition_features, probability))
    }

    fn attribute(
        &self,
        features: &AttritionFeatureVector,
        probability: f64,
    ) -> Result<Attribution, RiskError> {
        let raw = self.attrition.explain(features)?;
        attribution::name_contributions(self.attrition.model_name(), raw, probability)
    }

    fn observe_failure(&self, err: &RiskError) {
        match err {
            RiskError::Validation { .. } => {
                self.metrics.inc_validation_error();
                info!(error = %err, "rejected record");
            }
            RiskError::UnknownCategory { .. } => {
                self.metrics.inc_unknown_category();
                info!(error = %err, "rejected record");
            }
            RiskError::ModelContractViolation { .. } => {
                self.metrics.inc_contract_violation();
                error!(error = %err, "model contract violated");
            }
            RiskError::ExplainerUnavailable { .. } => {
                self.metrics.inc_explainer_unavailable();
                warn!(error = %err, "attribution unavailable");
            }
            RiskError::EncoderSchemaMismatch(_) => {
                error!(error = %err, "encoder registry mismatch");
            }
        }
    }
}
