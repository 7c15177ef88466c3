use serde::{Deserialize, Serialize};

/// Classifier input order. Must match the column order the models were fit on.
pub const FEATURE_NAMES: [&str; BASE_FEATURE_COUNT] = [
    "Age",
    "Gender",
    "JobRole",
    "MonthlyIncome",
    "WorkHoursPerWeek",
    "Overtime",
    "JobSatisfaction",
    "WorkLifeBalance",
    "YearsAtCompany",
    "PromotionGap",
    "ManagerSupport",
];

/// Trailing column appended for the attrition model only.
pub const BURNOUT_FEATURE: &str = "BurnoutRisk";

pub const BASE_FEATURE_COUNT: usize = 11;
pub const ATTRITION_FEATURE_COUNT: usize = BASE_FEATURE_COUNT + 1;

pub const GENDER_LABELS: &[&str] = &["Male", "Female"];
pub const JOB_ROLE_LABELS: &[&str] = &["Developer", "Data Analyst", "Manager", "HR", "Sales"];
pub const OVERTIME_LABELS: &[&str] = &["Yes", "No"];

pub fn attrition_feature_names() -> [&'static str; ATTRITION_FEATURE_COUNT] {
    let mut names = [BURNOUT_FEATURE; ATTRITION_FEATURE_COUNT];
    names[..BASE_FEATURE_COUNT].copy_from_slice(&FEATURE_NAMES);
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    Gender,
    JobRole,
    Overtime,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [Self::Gender, Self::JobRole, Self::Overtime];

    pub fn name(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::JobRole => "JobRole",
            Self::Overtime => "Overtime",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(value.trim()))
    }

    /// Labels the input form can produce; a fitted encoder must know all of them.
    pub fn declared_labels(self) -> &'static [&'static str] {
        match self {
            Self::Gender => GENDER_LABELS,
            Self::JobRole => JOB_ROLE_LABELS,
            Self::Overtime => OVERTIME_LABELS,
        }
    }
}

/// Closed range a numeric input must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumericDomain {
    pub field: &'static str,
    pub min: i64,
    pub max: i64,
}

impl NumericDomain {
    const fn new(field: &'static str, min: i64, max: i64) -> Self {
        Self { field, min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const AGE: NumericDomain = NumericDomain::new("Age", 22, 60);
pub const MONTHLY_INCOME: NumericDomain = NumericDomain::new("MonthlyIncome", 20_000, 120_000);
pub const WORK_HOURS_PER_WEEK: NumericDomain = NumericDomain::new("WorkHoursPerWeek", 35, 65);
pub const JOB_SATISFACTION: NumericDomain = NumericDomain::new("JobSatisfaction", 1, 5);
pub const WORK_LIFE_BALANCE: NumericDomain = NumericDomain::new("WorkLifeBalance", 1, 5);
pub const YEARS_AT_COMPANY: NumericDomain = NumericDomain::new("YearsAtCompany", 0, 15);
pub const PROMOTION_GAP: NumericDomain = NumericDomain::new("PromotionGap", 0, 7);
pub const MANAGER_SUPPORT: NumericDomain = NumericDomain::new("ManagerSupport", 1, 5);

pub const NUMERIC_DOMAINS: [NumericDomain; 8] = [
    AGE,
    MONTHLY_INCOME,
    WORK_HOURS_PER_WEEK,
    JOB_SATISFACTION,
    WORK_LIFE_BALANCE,
    YEARS_AT_COMPANY,
    PROMOTION_GAP,
    MANAGER_SUPPORT,
];
