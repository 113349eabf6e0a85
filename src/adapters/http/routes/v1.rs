use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::{api_key::ValidatedKey, email::OutboundEmail},
    domain::entities::email_log::EmailLog,
};

/// Routes that need a valid `x-api-key`.
/// The api_key_auth middleware is applied in mod.rs.
pub fn authenticated_router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send))
        .route("/logs", get(recent_logs))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct SendPayload {
    to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    success: bool,
    message_id: String,
}

#[derive(Serialize)]
struct LogsResponse {
    items: Vec<EmailLog>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    total_emails_sent: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/send
/// The body is parsed by hand so a missing or odd content type is not an error.
async fn send(
    State(app_state): State<AppState>,
    Extension(key): Extension<ValidatedKey>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let payload: SendPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Unparseable send payload");
        AppError::InvalidInput("Invalid JSON body".into())
    })?;

    let email =
        OutboundEmail::from_request(payload.to, payload.subject, payload.text, payload.html)?;

    let message_id = app_state.email_use_cases.send(&key, email).await?;

    Ok(Json(SendResponse {
        success: true,
        message_id,
    }))
}

/// GET /api/v1/logs
/// Latest log rows of the key's project.
async fn recent_logs(
    State(app_state): State<AppState>,
    Extension(key): Extension<ValidatedKey>,
) -> AppResult<impl IntoResponse> {
    let items = app_state
        .email_use_cases
        .recent_logs(key.project_id)
        .await?;
    Ok(Json(LogsResponse { items }))
}

/// GET /api/v1/stats
async fn stats(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse {
        total_emails_sent: app_state.email_use_cases.total_sent().await,
    })
}
