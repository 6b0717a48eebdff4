//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/analyze", post(analyze))
        .route("/analyze/", post(analyze))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Local web front-end origins only
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://127.0.0.1:5173"),
        ]))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,

    /// Submitter, logged only
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub sentiment: String,
    pub confidence: f32,
    pub probability: f32,
    pub message: String,
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    metrics::counter!("staysense_requests_total").increment(1);
    let Json(request) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    let request_id = Uuid::new_v4();
    debug!(%request_id, email = ?request.email, chars = request.text.len(), "Analyze request");

    let start = Instant::now();
    let prediction = state.engine.predict(&request.text).await?;
    let latency_us = start.elapsed().as_micros() as u64;

    metrics::histogram!("staysense_prediction_latency_us").record(latency_us as f64);
    metrics::counter!("staysense_predictions_total", "sentiment" => prediction.label.as_str())
        .increment(1);
    info!(
        %request_id,
        sentiment = prediction.label.as_str(),
        confidence = prediction.confidence,
        latency_us,
        "Review analyzed"
    );

    let sentiment = prediction.label.to_string();
    Ok(Json(AnalyzeResponse {
        message: format!(
            "Review analyzed! Sentiment: {} (Confidence: {:.2}%)",
            sentiment,
            prediction.confidence * 100.0
        ),
        sentiment,
        confidence: prediction.confidence,
        probability: prediction.probability,
    }))
}

#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    ScoringFailed(String),
    InternalError(String),
}

impl From<staysense_core::Error> for AppError {
    fn from(err: staysense_core::Error) -> Self {
        metrics::counter!("staysense_errors_total", "kind" => err.kind()).increment(1);
        match err {
            staysense_core::Error::ScoringFailure(msg) => AppError::ScoringFailed(msg),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::InvalidRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, "invalid_request_error", msg)
            }
            AppError::ScoringFailed(msg) => {
                error!("Scoring failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "scoring_failure", msg)
            }
            AppError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
