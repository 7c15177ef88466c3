use crate::models::{InputRecord, RiskTier};
use crate::rules::{
    LONG_HOURS_ABOVE, LOW_SATISFACTION_AT_MOST, STALLED_PROMOTION_AT_LEAST, WEAK_SUPPORT_AT_MOST,
};

pub const HIGH_HEADLINE: &str = "Immediate intervention required";
pub const MEDIUM_HEADLINE: &str = "Preventive actions recommended";
pub const LOW_HEADLINE: &str = "Employee is stable";

/// Preventive advice triggers one notch earlier than the rule table.
const MEDIUM_BALANCE_AT_MOST: i64 = 3;
const MEDIUM_SATISFACTION_AT_MOST: i64 = 3;

/// Maps a fused tier and the raw inputs to HR actions, most urgent first.
///
/// Each tier checks its conditions in a fixed order, so two requests that
/// trigger the same conditions always get the same list in the same order.
pub fn recommend(tier: RiskTier, record: &InputRecord) -> Vec<String> {
    let mut actions = Vec::new();

    match tier {
        RiskTier::High => {
            actions.push(HIGH_HEADLINE);
            if record.work_hours_per_week > LONG_HOURS_ABOVE {
                actions.push("Reduce excessive work hours");
            }
            if record.works_overtime() {
                actions.push("Limit overtime");
            }
            if record.job_satisfaction <= LOW_SATISFACTION_AT_MOST {
                actions.push("Address job dissatisfaction");
            }
            if record.manager_support <= WEAK_SUPPORT_AT_MOST {
                actions.push("Improve manager support");
            }
            if record.promotion_gap >= STALLED_PROMOTION_AT_LEAST {
                actions.push("Review promotion opportunities");
            }
        }
        RiskTier::Medium => {
            actions.push(MEDIUM_HEADLINE);
            if record.work_life_balance <= MEDIUM_BALANCE_AT_MOST {
                actions.push("Improve work-life balance");
            }
            if record.job_satisfaction <= MEDIUM_SATISFACTION_AT_MOST {
                actions.push("Increase recognition & feedback");
            }
            actions.push("Regular check-ins");
        }
        RiskTier::Low => {
            actions.extend([LOW_HEADLINE, "Maintain engagement", "Support career growth"]);
        }
    }

    actions.into_iter().map(str::to_string).collect()
}
