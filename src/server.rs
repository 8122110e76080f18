//! Axum REST front-end
//!
//! Exposes the pipeline as `POST /predict` plus a `GET /health` check,
//! mirroring the contract of the one-shot CLI command.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::rag::{PredictResponse, RagPipeline};

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub query: String,
}

/// Build the application router.
pub fn router(pipeline: Arc<RagPipeline>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(pipeline)
}

/// Bind and serve until the process is stopped.
pub async fn serve(pipeline: Arc<RagPipeline>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Serving on http://{addr}");

    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

async fn predict(
    State(pipeline): State<Arc<RagPipeline>>,
    Json(request): Json<PredictRequest>,
) -> (StatusCode, Json<PredictResponse>) {
    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PredictResponse::failure("No query provided")),
        );
    }

    let outcome = pipeline.predict(&request.query).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome))
}

// The pipeline (and its loaded model) must exist before the router does, so
// reachability is the whole health statement.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_request_defaults_query() {
        let request: PredictRequest = serde_json::from_str("{}").unwrap();
        assert!(request.query.is_empty());

        let request: PredictRequest =
            serde_json::from_str(r#"{"query":"aqi in delhi"}"#).unwrap();
        assert_eq!(request.query, "aqi in delhi");
    }

    #[tokio::test]
    async fn test_health_reports_status_only() {
        let Json(body) = health().await;
        assert_eq!(body, serde_json::json!({ "status": "healthy" }));
    }
}
