//! HTTP surface: the messaging webhook, health, and metrics.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use gable_core::errors::CoreError;
use gable_runtime::{RuntimeError, TurnRunner};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The turn runner.
    pub runner: Arc<TurnRunner>,
    /// Renders the Prometheus scrape output.
    pub metrics: PrometheusHandle,
}

/// Build the router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/message", post(webhook_message))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Inbound webhook payload from the messaging gateway.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// Sender messaging address.
    pub from: String,
    /// Message text.
    pub body: String,
    /// Gateway message ID (idempotency key).
    pub message_id: String,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Reply text for the gateway to deliver.
    pub reply: String,
}

async fn webhook_message(
    State(state): State<AppState>,
    axum::Json(request): axum::Json<WebhookRequest>,
) -> Response {
    match state
        .runner
        .handle_message(&request.from, &request.body, &request.message_id)
        .await
    {
        Ok(outcome) => {
            info!(
                message_id = %request.message_id,
                duplicate = outcome.duplicate,
                tool_calls = outcome.tool_calls,
                "webhook handled"
            );
            (StatusCode::OK, axum::Json(WebhookResponse { reply: outcome.reply })).into_response()
        }
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &RuntimeError) -> Response {
    let status = match err {
        RuntimeError::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
        RuntimeError::Core(CoreError::InvalidAction(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %err, status = %status, "webhook failed");
    (status, axum::Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
