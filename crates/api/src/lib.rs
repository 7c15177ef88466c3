use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use burnwatch_core::schema::{
    attrition_feature_names, CategoricalField, NumericDomain, FEATURE_NAMES, NUMERIC_DOMAINS,
};
use burnwatch_core::{InputRecord, ModelProvenance, RiskError};
use burnwatch_observability::{AppMetrics, MetricsSnapshot};
use burnwatch_pipeline::{PipelineSettings, RiskPipeline};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<RiskPipeline>,
    pub metrics: Arc<AppMetrics>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    models: ModelProvenance,
    metrics: MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct CategoricalDomain {
    field: &'static str,
    labels: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    burnout_features: Vec<&'static str>,
    attrition_features: Vec<&'static str>,
    numeric_domains: Vec<NumericDomain>,
    categorical_domains: Vec<CategoricalDomain>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// `RiskError` as an HTTP response: caller mistakes are 422, the rest 500.
struct ApiError(RiskError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_caller_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Loads settings from the environment and the artifacts they name.
pub fn build_app_from_env() -> Result<Router> {
    let settings = PipelineSettings::from_env()?;
    build_app(settings)
}

pub fn build_app(settings: PipelineSettings) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let pipeline = RiskPipeline::load(settings, metrics.clone())?;

    Ok(build_router(ApiState {
        pipeline: Arc::new(pipeline),
        metrics,
    }))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/schema", get(schema))
        .route("/v1/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        models: state.pipeline.provenance(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn schema(State(state): State<ApiState>) -> impl IntoResponse {
    let encoders = state.pipeline.encoders();
    let categorical_domains = CategoricalField::ALL
        .into_iter()
        .map(|field| CategoricalDomain {
            field: field.name(),
            labels: encoders
                .table(field)
                .map(|table| table.classes().to_vec())
                .unwrap_or_default(),
        })
        .collect();

    Json(SchemaResponse {
        burnout_features: FEATURE_NAMES.to_vec(),
        attrition_features: attrition_feature_names().to_vec(),
        numeric_domains: NUMERIC_DOMAINS.to_vec(),
        categorical_domains,
    })
}

/// Body that never decoded into an `InputRecord`.
struct BadRequest(JsonRejection);

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "invalid_request",
            message: self.0.body_text(),
        };
        (self.0.status(), Json(body)).into_response()
    }
}

async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<InputRecord>, JsonRejection>,
) -> Response {
    let Json(record) = match payload {
        Ok(record) => record,
        Err(rejection) => {
            state.metrics.inc_validation_error();
            return BadRequest(rejection).into_response();
        }
    };

    match state.pipeline.predict_risk(&record) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}
