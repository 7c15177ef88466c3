use burnwatch_core::{Attribution, AttritionFeatureVector, RiskError};
use burnwatch_ml::RawAttribution;

/// Largest tolerated gap between `baseline + Σ contributions` and the
/// probability the model reported for the same instance.
pub const ADDITIVITY_TOLERANCE: f64 = 1e-6;

/// Names the raw per-column values and orders them by magnitude.
///
/// A value list of the wrong width or a reconstruction that misses the model
/// output points at a broken explainer and is reported as a contract violation.
pub fn name_contributions(
    model: &str,
    raw: RawAttribution,
    probability: f64,
) -> Result<Attribution, RiskError> {
    let names = AttritionFeatureVector::names();
    if raw.values.len() != names.len() {
        return Err(RiskError::contract(
            model,
            format!(
                "explainer returned {} values for {} features",
                raw.values.len(),
                names.len()
            ),
        ));
    }

    let attribution = Attribution::from_values(&names, raw.baseline, &raw.values);
    let gap = (attribution.reconstructed() - probability).abs();
    if gap.is_nan() || gap > ADDITIVITY_TOLERANCE {
        return Err(RiskError::contract(
            model,
            format!("attribution misses the model output by {gap}"),
        ));
    }

    Ok(attribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: Vec<f64>) -> RawAttribution {
        RawAttribution {
            baseline: 0.3,
            values,
        }
    }

    #[test]
    fn names_follow_schema_and_sort_by_magnitude() {
        let mut values = vec![0.0; 12];
        values[6] = -0.05;
        values[11] = 0.2;
        values[4] = 0.05;

        let attribution = name_contributions("forest", raw(values), 0.5).unwrap();
        let order = attribution
            .contributions
            .iter()
            .take(3)
            .map(|c| c.feature.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["BurnoutRisk", "WorkHoursPerWeek", "JobSatisfaction"]);
        assert_eq!(attribution.contributions.len(), 12);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let err = name_contributions("forest", raw(vec![0.1; 11]), 0.4).unwrap_err();
        assert_eq!(err.kind(), "model_contract_violation");
    }

    #[test]
    fn broken_additivity_is_rejected() {
        let err = name_contributions("forest", raw(vec![0.0; 12]), 0.9).unwrap_err();
        assert!(err.to_string().contains("misses the model output"));
    }
}
