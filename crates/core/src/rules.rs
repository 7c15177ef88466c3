use serde::{Deserialize, Serialize};

use crate::models::InputRecord;

pub const MAX_RULE_SCORE: u8 = 100;

pub const LONG_HOURS_ABOVE: i64 = 55;
pub const LOW_SATISFACTION_AT_MOST: i64 = 2;
pub const POOR_BALANCE_AT_MOST: i64 = 2;
pub const WEAK_SUPPORT_AT_MOST: i64 = 2;
pub const STALLED_PROMOTION_AT_LEAST: i64 = 4;
pub const LOW_INCOME_BELOW: i64 = 30_000;

/// Structural risk conditions checked on raw, unencoded inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    LongHours,
    Overtime,
    LowJobSatisfaction,
    PoorWorkLifeBalance,
    WeakManagerSupport,
    StalledPromotion,
    LowIncome,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 7] = [
        Self::LongHours,
        Self::Overtime,
        Self::LowJobSatisfaction,
        Self::PoorWorkLifeBalance,
        Self::WeakManagerSupport,
        Self::StalledPromotion,
        Self::LowIncome,
    ];

    pub fn points(self) -> u8 {
        match self {
            Self::LongHours => 15,
            Self::Overtime => 10,
            Self::LowJobSatisfaction => 20,
            Self::PoorWorkLifeBalance => 15,
            Self::WeakManagerSupport => 15,
            Self::StalledPromotion => 10,
            Self::LowIncome => 10,
        }
    }

    pub fn applies(self, record: &InputRecord) -> bool {
        match self {
            Self::LongHours => record.work_hours_per_week > LONG_HOURS_ABOVE,
            Self::Overtime => record.works_overtime(),
            Self::LowJobSatisfaction => record.job_satisfaction <= LOW_SATISFACTION_AT_MOST,
            Self::PoorWorkLifeBalance => record.work_life_balance <= POOR_BALANCE_AT_MOST,
            Self::WeakManagerSupport => record.manager_support <= WEAK_SUPPORT_AT_MOST,
            Self::StalledPromotion => record.promotion_gap >= STALLED_PROMOTION_AT_LEAST,
            Self::LowIncome => record.monthly_income < LOW_INCOME_BELOW,
        }
    }

    fn notes(self, record: &InputRecord) -> String {
        match self {
            Self::LongHours => format!(
                "{} hours per week exceeds {LONG_HOURS_ABOVE}",
                record.work_hours_per_week
            ),
            Self::Overtime => "works overtime".to_string(),
            Self::LowJobSatisfaction => {
                format!("job satisfaction {} of 5", record.job_satisfaction)
            }
            Self::PoorWorkLifeBalance => {
                format!("work-life balance {} of 5", record.work_life_balance)
            }
            Self::WeakManagerSupport => {
                format!("manager support {} of 5", record.manager_support)
            }
            Self::StalledPromotion => {
                format!("{} years since last promotion", record.promotion_gap)
            }
            Self::LowIncome => format!(
                "monthly income {} below {LOW_INCOME_BELOW}",
                record.monthly_income
            ),
        }
    }
}

/// One fired rule, kept so the score can be audited line by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub factor: RiskFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleScore {
    pub total: u8,
    pub hits: Vec<RuleHit>,
}

/// Additive point table over raw inputs, capped at [`MAX_RULE_SCORE`].
///
/// Independent of any model. Each factor contributes at most once, so the
/// total only grows as conditions worsen.
pub fn score_rules(record: &InputRecord) -> RuleScore {
    let hits = RiskFactor::ALL
        .into_iter()
        .filter(|factor| factor.applies(record))
        .map(|factor| RuleHit {
            factor,
            points: factor.points(),
            notes: factor.notes(record),
        })
        .collect::<Vec<_>>();

    let sum: u16 = hits.iter().map(|hit| u16::from(hit.points)).sum();
    let total = sum.min(u16::from(MAX_RULE_SCORE)) as u8;

    RuleScore { total, hits }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_record, strained_record};
    use proptest::prelude::*;

    #[test]
    fn calm_profile_scores_zero() {
        let score = score_rules(&sample_record());
        assert_eq!(score.total, 0);
        assert!(score.hits.is_empty());
    }

    #[test]
    fn every_rule_fires_for_strained_profile() {
        let score = score_rules(&strained_record());
        assert_eq!(score.total, 95);
        assert_eq!(score.hits.len(), RiskFactor::ALL.len());
        assert_eq!(score.hits[0].factor, RiskFactor::LongHours);
        assert_eq!(score.hits[0].notes, "60 hours per week exceeds 55");
    }

    #[test]
    fn thresholds_are_inclusive_where_documented() {
        let mut record = sample_record();
        record.work_hours_per_week = 55;
        record.job_satisfaction = 2;
        record.promotion_gap = 4;
        record.monthly_income = 30_000;

        let factors = score_rules(&record)
            .hits
            .into_iter()
            .map(|hit| hit.factor)
            .collect::<Vec<_>>();
        assert_eq!(
            factors,
            vec![RiskFactor::LowJobSatisfaction, RiskFactor::StalledPromotion]
        );
    }

    fn arb_record() -> impl Strategy<Value = InputRecord> {
        (
            (35_i64..=65, any::<bool>(), 1_i64..=5, 1_i64..=5),
            (1_i64..=5, 0_i64..=7, 20_000_i64..=120_000),
        )
            .prop_map(|((hours, overtime, sat, wlb), (support, gap, income))| {
                let mut record = sample_record();
                record.work_hours_per_week = hours;
                record.overtime = if overtime { "Yes" } else { "No" }.to_string();
                record.job_satisfaction = sat;
                record.work_life_balance = wlb;
                record.manager_support = support;
                record.promotion_gap = gap;
                record.monthly_income = income;
                record
            })
    }

    proptest! {
        #[test]
        fn score_stays_within_bounds(record in arb_record()) {
            let score = score_rules(&record);
            prop_assert!(score.total <= MAX_RULE_SCORE);
            let expected: u16 = score.hits.iter().map(|hit| u16::from(hit.points)).sum();
            prop_assert_eq!(u16::from(score.total), expected.min(100));
        }

        #[test]
        fn worsening_hours_never_lowers_score(record in arb_record(), extra in 0_i64..=30) {
            let mut worse = record.clone();
            worse.work_hours_per_week = (record.work_hours_per_week + extra).min(65);
            prop_assert!(score_rules(&worse).total >= score_rules(&record).total);
        }

        #[test]
        fn starting_overtime_never_lowers_score(record in arb_record()) {
            let mut calm = record.clone();
            calm.overtime = "No".to_string();
            let mut worse = record;
            worse.overtime = "Yes".to_string();
            prop_assert!(fires(&worse, RiskFactor::Overtime));
            prop_assert!(score_rules(&worse).total >= score_rules(&calm).total);
        }

        #[test]
        fn longer_promotion_gap_never_lowers_score(record in arb_record(), extra in 0_i64..=7) {
            let mut worse = record.clone();
            worse.promotion_gap = (record.promotion_gap + extra).min(7);
            prop_assert!(score_rules(&worse).total >= score_rules(&record).total);
        }

        #[test]
        fn stalled_promotion_fires_from_four_years(record in arb_record(), gap in 4_i64..=7) {
            let mut recent = record.clone();
            recent.promotion_gap = 3;
            let mut stalled = record;
            stalled.promotion_gap = gap;
            prop_assert!(!fires(&recent, RiskFactor::StalledPromotion));
            prop_assert!(fires(&stalled, RiskFactor::StalledPromotion));
            prop_assert!(score_rules(&stalled).total >= score_rules(&recent).total);
        }

        #[test]
        fn lower_income_never_lowers_score(record in arb_record(), cut in 0_i64..=100_000) {
            let mut worse = record.clone();
            worse.monthly_income = (record.monthly_income - cut).max(20_000);
            prop_assert!(score_rules(&worse).total >= score_rules(&record).total);
        }

        #[test]
        fn low_income_fires_below_thirty_thousand(record in arb_record(), income in 20_000_i64..30_000) {
            let mut paid = record.clone();
            paid.monthly_income = LOW_INCOME_BELOW;
            let mut underpaid = record;
            underpaid.monthly_income = income;
            prop_assert!(!fires(&paid, RiskFactor::LowIncome));
            prop_assert!(fires(&underpaid, RiskFactor::LowIncome));
            prop_assert!(score_rules(&underpaid).total >= score_rules(&paid).total);
        }

        #[test]
        fn lower_satisfaction_never_lowers_score(record in arb_record(), delta in 0_i64..=4) {
            let mut worse = record.clone();
            worse.job_satisfaction = (record.job_satisfaction - delta).max(1);
            prop_assert!(score_rules(&worse).total >= score_rules(&record).total);
        }

        #[test]
        fn poorer_balance_never_lowers_score(record in arb_record(), delta in 0_i64..=4) {
            let mut worse = record.clone();
            worse.work_life_balance = (record.work_life_balance - delta).max(1);
            prop_assert!(score_rules(&worse).total >= score_rules(&record).total);
        }

        #[test]
        fn weaker_support_never_lowers_score(record in arb_record(), delta in 0_i64..=4) {
            let mut worse = record.clone();
            worse.manager_support = (record.manager_support - delta).max(1);
            prop_assert!(score_rules(&worse).total >= score_rules(&record).total);
        }
    }

    fn fires(record: &InputRecord, factor: RiskFactor) -> bool {
        score_rules(record).hits.iter().any(|hit| hit.factor == factor)
    }
}
