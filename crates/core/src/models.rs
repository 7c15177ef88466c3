use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::rules::RuleHit;
use crate::schema::{
    NumericDomain, AGE, JOB_SATISFACTION, MANAGER_SUPPORT, MONTHLY_INCOME, PROMOTION_GAP,
    WORK_HOURS_PER_WEEK, WORK_LIFE_BALANCE, YEARS_AT_COMPANY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobRole {
    Developer,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    Manager,
    #[serde(rename = "HR")]
    Hr,
    Sales,
}

impl JobRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Developer => "Developer",
            Self::DataAnalyst => "Data Analyst",
            Self::Manager => "Manager",
            Self::Hr => "HR",
            Self::Sales => "Sales",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Developer" => Some(Self::Developer),
            "Data Analyst" => Some(Self::DataAnalyst),
            "Manager" => Some(Self::Manager),
            "HR" => Some(Self::Hr),
            "Sales" => Some(Self::Sales),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Overtime {
    Yes,
    No,
}

impl Overtime {
    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }
}

/// One employee as submitted by the presentation layer.
///
/// Categorical fields hold the raw labels; the encoder registry decides
/// whether a label is known. Numeric fields are checked by [`InputRecord::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub age: i64,
    pub gender: String,
    pub job_role: String,
    pub monthly_income: i64,
    pub work_hours_per_week: i64,
    pub overtime: String,
    pub job_satisfaction: i64,
    pub work_life_balance: i64,
    pub years_at_company: i64,
    pub promotion_gap: i64,
    pub manager_support: i64,
}

impl InputRecord {
    /// Rejects the first numeric field outside its declared domain.
    pub fn validate(&self) -> Result<(), RiskError> {
        let checks: [(NumericDomain, i64); 8] = [
            (AGE, self.age),
            (MONTHLY_INCOME, self.monthly_income),
            (WORK_HOURS_PER_WEEK, self.work_hours_per_week),
            (JOB_SATISFACTION, self.job_satisfaction),
            (WORK_LIFE_BALANCE, self.work_life_balance),
            (YEARS_AT_COMPANY, self.years_at_company),
            (PROMOTION_GAP, self.promotion_gap),
            (MANAGER_SUPPORT, self.manager_support),
        ];

        for (domain, value) in checks {
            if !domain.contains(value) {
                return Err(RiskError::Validation {
                    field: domain.field,
                    value,
                    min: domain.min,
                    max: domain.max,
                });
            }
        }

        Ok(())
    }

    pub fn works_overtime(&self) -> bool {
        Overtime::parse(&self.overtime) == Some(Overtime::Yes)
    }
}

/// Burnout class predicted by the burnout model. Ordinal: `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BurnoutTier {
    Low,
    Medium,
    High,
}

impl BurnoutTier {
    pub const ALL: [BurnoutTier; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn code(self) -> i64 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Fused attrition risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model-side signals for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub burnout_tier: BurnoutTier,
    /// Probability of leaving, in percent.
    pub attrition_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub final_risk_percent: f64,
    pub tier: RiskTier,
    pub burnout_tier: BurnoutTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
}

/// Local explanation of one attrition probability.
///
/// `baseline + Σ value` reconstructs the model output for the explained
/// instance. Contributions are sorted by descending magnitude; ties keep
/// feature schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub baseline: f64,
    pub contributions: Vec<FeatureContribution>,
}

impl Attribution {
    pub fn from_values(names: &[&str], baseline: f64, values: &[f64]) -> Self {
        let mut contributions = names
            .iter()
            .zip(values.iter())
            .map(|(name, value)| FeatureContribution {
                feature: (*name).to_string(),
                value: *value,
            })
            .collect::<Vec<_>>();

        contributions.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));

        Self {
            baseline,
            contributions,
        }
    }

    pub fn top(&self, k: usize) -> Self {
        Self {
            baseline: self.baseline,
            contributions: self.contributions.iter().take(k).cloned().collect(),
        }
    }

    /// Baseline plus every contribution held by this value.
    pub fn reconstructed(&self) -> f64 {
        self.baseline
            + self
                .contributions
                .iter()
                .map(|contribution| contribution.value)
                .sum::<f64>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProvenance {
    pub burnout_model: String,
    pub attrition_model: String,
}

/// Everything the presentation layer needs to render one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub burnout_tier: BurnoutTier,
    pub attrition_probability: f64,
    pub rule_score: u8,
    pub rule_hits: Vec<RuleHit>,
    pub final_risk: f64,
    pub tier: RiskTier,
    pub attribution: Option<Attribution>,
    pub recommendations: Vec<String>,
    pub models: ModelProvenance,
}
