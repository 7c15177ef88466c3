use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{ModelScore, RiskAssessment, RiskTier};
use crate::rules::RuleScore;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Blend weights and tier cut-offs for the hybrid risk score.
///
/// Tiers are closed-open: a score equal to `high_threshold` is HIGH, equal to
/// `medium_threshold` is MEDIUM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionPolicy {
    pub model_weight: f64,
    pub rule_weight: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            model_weight: 0.6,
            rule_weight: 0.4,
            high_threshold: 70.0,
            medium_threshold: 40.0,
        }
    }
}

impl FusionPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights_ok = [self.model_weight, self.rule_weight]
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0)
            && ((self.model_weight + self.rule_weight) - 1.0).abs() <= WEIGHT_SUM_TOLERANCE;
        if !weights_ok {
            return Err(ConfigError::InvalidWeights {
                model: self.model_weight,
                rules: self.rule_weight,
            });
        }

        let thresholds_ok = self.medium_threshold.is_finite()
            && self.high_threshold.is_finite()
            && 0.0 <= self.medium_threshold
            && self.medium_threshold < self.high_threshold
            && self.high_threshold <= 100.0;
        if !thresholds_ok {
            return Err(ConfigError::InvalidThresholds {
                medium: self.medium_threshold,
                high: self.high_threshold,
            });
        }

        Ok(())
    }

    /// Weighted blend of the model percentage and the rule score, in [0, 100].
    pub fn blend(&self, attrition_percent: f64, rule_score: u8) -> f64 {
        let blended =
            self.model_weight * attrition_percent + self.rule_weight * f64::from(rule_score);
        blended.clamp(0.0, 100.0)
    }

    pub fn tier_for(&self, final_risk: f64) -> RiskTier {
        if final_risk >= self.high_threshold {
            RiskTier::High
        } else if final_risk >= self.medium_threshold {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn assess(&self, model: &ModelScore, rules: &RuleScore) -> RiskAssessment {
        let final_risk_percent = self.blend(model.attrition_probability, rules.total);
        RiskAssessment {
            final_risk_percent,
            tier: self.tier_for(final_risk_percent),
            burnout_tier: model.burnout_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BurnoutTier;

    #[test]
    fn tier_boundaries_are_closed_open() {
        let policy = FusionPolicy::default();
        assert_eq!(policy.tier_for(70.0), RiskTier::High);
        assert_eq!(policy.tier_for(69.999_999), RiskTier::Medium);
        assert_eq!(policy.tier_for(40.0), RiskTier::Medium);
        assert_eq!(policy.tier_for(39.999_999), RiskTier::Low);
        assert_eq!(policy.tier_for(0.0), RiskTier::Low);
        assert_eq!(policy.tier_for(100.0), RiskTier::High);
    }

    #[test]
    fn rule_score_alone_sets_a_floor() {
        let policy = FusionPolicy::default();
        let rules = RuleScore {
            total: 95,
            hits: Vec::new(),
        };
        let assessment = policy.assess(
            &ModelScore {
                burnout_tier: BurnoutTier::Low,
                attrition_probability: 0.0,
            },
            &rules,
        );
        assert!((assessment.final_risk_percent - 38.0).abs() < 1e-9);
        assert_eq!(assessment.tier, RiskTier::Low);

        let assessment = policy.assess(
            &ModelScore {
                burnout_tier: BurnoutTier::High,
                attrition_probability: 75.0,
            },
            &rules,
        );
        assert!((assessment.final_risk_percent - 83.0).abs() < 1e-9);
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(assessment.burnout_tier, BurnoutTier::High);
    }

    #[test]
    fn blend_is_clamped() {
        let policy = FusionPolicy {
            model_weight: 1.0,
            rule_weight: 0.0,
            ..FusionPolicy::default()
        };
        assert_eq!(policy.blend(130.0, 0), 100.0);
        assert_eq!(policy.blend(-5.0, 0), 0.0);
    }

    #[test]
    fn rejects_bad_calibration() {
        let skewed = FusionPolicy {
            model_weight: 0.7,
            rule_weight: 0.4,
            ..FusionPolicy::default()
        };
        assert!(matches!(
            skewed.validate(),
            Err(ConfigError::InvalidWeights { .. })
        ));

        let inverted = FusionPolicy {
            high_threshold: 40.0,
            medium_threshold: 70.0,
            ..FusionPolicy::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidThresholds { .. })
        ));

        assert_eq!(FusionPolicy::default().validate(), Ok(()));
    }
}
