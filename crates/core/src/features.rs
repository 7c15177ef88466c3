use crate::encoding::CategoricalEncoderRegistry;
use crate::error::RiskError;
use crate::models::{BurnoutTier, InputRecord};
use crate::schema::{
    attrition_feature_names, CategoricalField, ATTRITION_FEATURE_COUNT, BASE_FEATURE_COUNT,
    FEATURE_NAMES,
};

/// Numeric burnout-model input in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedFeatureVector {
    values: [f64; BASE_FEATURE_COUNT],
}

impl EncodedFeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn names() -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    /// Attrition-model input: this vector plus the burnout code as the last column.
    pub fn with_burnout(&self, tier: BurnoutTier) -> AttritionFeatureVector {
        let mut values = [0.0; ATTRITION_FEATURE_COUNT];
        values[..BASE_FEATURE_COUNT].copy_from_slice(&self.values);
        values[BASE_FEATURE_COUNT] = tier.code() as f64;
        AttritionFeatureVector { values, tier }
    }
}

/// Attrition-model input. Only obtainable from a burnout tier, so the
/// attrition model can never be queried ahead of the burnout model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttritionFeatureVector {
    values: [f64; ATTRITION_FEATURE_COUNT],
    tier: BurnoutTier,
}

impl AttritionFeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn burnout_tier(&self) -> BurnoutTier {
        self.tier
    }

    pub fn names() -> [&'static str; ATTRITION_FEATURE_COUNT] {
        attrition_feature_names()
    }
}

pub struct FeatureVectorBuilder<'a> {
    encoders: &'a CategoricalEncoderRegistry,
}

impl<'a> FeatureVectorBuilder<'a> {
    pub fn new(encoders: &'a CategoricalEncoderRegistry) -> Self {
        Self { encoders }
    }

    /// Validates, encodes and lays out one record. No model is touched.
    pub fn build(&self, record: &InputRecord) -> Result<EncodedFeatureVector, RiskError> {
        record.validate()?;

        let gender = self.encoders.encode(CategoricalField::Gender, &record.gender)?;
        let job_role = self
            .encoders
            .encode(CategoricalField::JobRole, &record.job_role)?;
        let overtime = self
            .encoders
            .encode(CategoricalField::Overtime, &record.overtime)?;

        Ok(EncodedFeatureVector {
            values: [
                record.age as f64,
                gender as f64,
                job_role as f64,
                record.monthly_income as f64,
                record.work_hours_per_week as f64,
                overtime as f64,
                record.job_satisfaction as f64,
                record.work_life_balance as f64,
                record.years_at_company as f64,
                record.promotion_gap as f64,
                record.manager_support as f64,
            ],
        })
    }
}
