use std::path::PathBuf;
use std::sync::Arc;

use burnwatch_core::{BurnoutTier, InputRecord, RiskFactor, RiskTier};
use burnwatch_ml::{Classifier, LogisticModel, ModelArtifacts};
use burnwatch_observability::AppMetrics;
use burnwatch_pipeline::{PipelineSettings, RiskPipeline};

fn model_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models")
}

fn pipeline() -> RiskPipeline {
    let settings = PipelineSettings {
        model_dir: model_dir(),
        ..PipelineSettings::default()
    };
    RiskPipeline::load(settings, AppMetrics::shared()).expect("fixture artifacts load")
}

fn default_form() -> InputRecord {
    InputRecord {
        age: 30,
        gender: "Male".to_string(),
        job_role: "Developer".to_string(),
        monthly_income: 50_000,
        work_hours_per_week: 45,
        overtime: "No".to_string(),
        job_satisfaction: 3,
        work_life_balance: 3,
        years_at_company: 3,
        promotion_gap: 2,
        manager_support: 3,
    }
}

fn overloaded_employee() -> InputRecord {
    InputRecord {
        monthly_income: 25_000,
        work_hours_per_week: 60,
        overtime: "Yes".to_string(),
        job_satisfaction: 1,
        work_life_balance: 1,
        promotion_gap: 5,
        manager_support: 1,
        ..default_form()
    }
}

#[test]
fn default_form_is_low_risk_and_model_driven() {
    let result = pipeline().predict_risk(&default_form()).unwrap();

    assert_eq!(result.burnout_tier, BurnoutTier::Low);
    assert!((result.attrition_probability - 12.5).abs() < 1e-9);
    assert_eq!(result.rule_score, 0);
    assert!(result.rule_hits.is_empty());
    assert!((result.final_risk - 0.6 * result.attrition_probability).abs() < 1e-9);
    assert_eq!(result.tier, RiskTier::Low);
    assert_eq!(
        result.recommendations,
        vec!["Employee is stable", "Maintain engagement", "Support career growth"]
    );
    assert_eq!(result.models.attrition_model, "attrition_forest_v1");
}

#[test]
fn overloaded_employee_is_high_risk_with_every_rule_fired() {
    let result = pipeline().predict_risk(&overloaded_employee()).unwrap();

    assert_eq!(result.burnout_tier, BurnoutTier::High);
    assert!((result.attrition_probability - 75.0).abs() < 1e-9);
    assert_eq!(result.rule_score, 95);
    assert_eq!(result.rule_hits.len(), RiskFactor::ALL.len());
    assert!((result.final_risk - 83.0).abs() < 1e-9);
    assert_eq!(result.tier, RiskTier::High);
    assert_eq!(
        result.recommendations,
        vec![
            "Immediate intervention required",
            "Reduce excessive work hours",
            "Limit overtime",
            "Address job dissatisfaction",
            "Improve manager support",
            "Review promotion opportunities",
        ]
    );
}

#[test]
fn attribution_is_truncated_and_sorted() {
    let result = pipeline().predict_risk(&overloaded_employee()).unwrap();
    let attribution = result.attribution.expect("tree forest explains");

    assert_eq!(attribution.contributions.len(), 5);
    let magnitudes = attribution
        .contributions
        .iter()
        .map(|c| c.value.abs())
        .collect::<Vec<_>>();
    assert!(magnitudes.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn full_explanation_reconstructs_probability() {
    let pipeline = pipeline();
    for record in [default_form(), overloaded_employee()] {
        let result = pipeline.predict_risk(&record).unwrap();
        let attribution = pipeline.explain(&record).unwrap();

        assert_eq!(attribution.contributions.len(), 12);
        let probability = result.attrition_probability / 100.0;
        assert!((attribution.reconstructed() - probability).abs() < 1e-9);
    }
}

#[test]
fn unused_columns_get_no_credit() {
    let attribution = pipeline().explain(&overloaded_employee()).unwrap();
    for feature in ["Age", "Gender", "JobRole", "YearsAtCompany"] {
        let entry = attribution
            .contributions
            .iter()
            .find(|c| c.feature == feature)
            .unwrap();
        assert_eq!(entry.value, 0.0, "{feature}");
    }
}

#[test]
fn unknown_gender_is_rejected_before_scoring() {
    let pipeline = pipeline();
    let mut record = default_form();
    record.gender = "Other".to_string();

    let err = pipeline.predict_risk(&record).unwrap_err();
    assert_eq!(err.kind(), "unknown_category");
    assert_eq!(pipeline.metrics().snapshot().predictions_total, 0);
}

#[test]
fn predictions_are_idempotent() {
    let pipeline = pipeline();
    let first = pipeline.predict_risk(&overloaded_employee()).unwrap();
    let second = pipeline.predict_risk(&overloaded_employee()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn linear_attrition_model_drops_attribution_only() {
    let artifacts = ModelArtifacts::load_dir(&model_dir()).unwrap();
    let mut weights = vec![0.0; 12];
    weights[11] = 1.0;
    let linear: Arc<dyn Classifier> = Arc::new(
        LogisticModel::new("attrition_linear", 12, 2, None, vec![weights], vec![-1.0]).unwrap(),
    );

    let pipeline = RiskPipeline::new(
        artifacts.burnout,
        linear,
        artifacts.encoders,
        PipelineSettings::default(),
        AppMetrics::shared(),
    )
    .unwrap();

    let result = pipeline.predict_risk(&overloaded_employee()).unwrap();
    assert!(result.attribution.is_none());
    // burnout High feeds code 2 into the logit: sigmoid(1).
    let expected = 100.0 / (1.0 + (-1.0_f64).exp());
    assert!((result.attrition_probability - expected).abs() < 1e-9);
    assert_eq!(result.tier, RiskTier::High);
    assert_eq!(pipeline.metrics().snapshot().explainer_unavailable_total, 1);
}

#[test]
fn schema_mismatched_model_is_refused() {
    let artifacts = ModelArtifacts::load_dir(&model_dir()).unwrap();
    let err = RiskPipeline::new(
        artifacts.attrition.clone(),
        artifacts.attrition,
        artifacts.encoders,
        PipelineSettings::default(),
        AppMetrics::shared(),
    )
    .err()
    .unwrap();
    assert_eq!(err.kind(), "model_contract_violation");
}
