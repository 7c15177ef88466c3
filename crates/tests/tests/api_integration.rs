use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use burnwatch_api::build_app;
use burnwatch_pipeline::PipelineSettings;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let settings = PipelineSettings {
        model_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models"),
        ..PipelineSettings::default()
    };
    build_app(settings).expect("app should build")
}

fn record() -> Value {
    json!({
        "age": 30,
        "gender": "Male",
        "job_role": "Developer",
        "monthly_income": 25000,
        "work_hours_per_week": 60,
        "overtime": "Yes",
        "job_satisfaction": 1,
        "work_life_balance": 1,
        "years_at_company": 3,
        "promotion_gap": 5,
        "manager_support": 1
    })
}

async fn post_predict(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_models_and_metrics() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["models"]["burnout_model"], "burnout_forest_v1");
    assert_eq!(parsed["metrics"]["predictions_total"], 0);
}

#[tokio::test]
async fn schema_lists_feature_order_and_domains() {
    let response = app()
        .oneshot(Request::builder().uri("/v1/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["attrition_features"][11], "BurnoutRisk");
    assert_eq!(parsed["burnout_features"].as_array().unwrap().len(), 11);
    assert_eq!(
        parsed["categorical_domains"][1],
        json!({
            "field": "JobRole",
            "labels": ["Data Analyst", "Developer", "HR", "Manager", "Sales"]
        })
    );
}

#[tokio::test]
async fn predict_returns_full_result() {
    let (status, parsed) = post_predict(app(), record()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parsed["tier"], "HIGH");
    assert_eq!(parsed["burnout_tier"], "High");
    assert_eq!(parsed["rule_score"], 95);
    assert_eq!(parsed["recommendations"][0], "Immediate intervention required");
    assert_eq!(parsed["attribution"]["contributions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn unknown_category_is_unprocessable() {
    let mut body = record();
    body["gender"] = json!("Other");

    let (status, parsed) = post_predict(app(), body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parsed["error"], "unknown_category");
    assert!(parsed["message"].as_str().unwrap().contains("Other"));
}

#[tokio::test]
async fn out_of_range_value_is_unprocessable() {
    let mut body = record();
    body["age"] = json!(70);

    let (status, parsed) = post_predict(app(), body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parsed["error"], "validation_error");
}

#[tokio::test]
async fn incomplete_body_gets_a_json_error() {
    let mut body = record();
    body.as_object_mut().unwrap().remove("age");

    let (status, parsed) = post_predict(app(), body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parsed["error"], "invalid_request");
    assert!(parsed["message"].as_str().unwrap().contains("age"));
}

#[tokio::test]
async fn malformed_json_gets_a_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from("{\"age\": 30,"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["error"], "invalid_request");
}
