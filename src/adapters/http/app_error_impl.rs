use crate::app_error::AppError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let message = match self {
            AppError::MissingApiKey => "API key is required".to_string(),
            AppError::InvalidApiKey => "Invalid or revoked API key".to_string(),
            AppError::MissingFields => {
                "Missing required fields: to, subject, and text/html".to_string()
            }
            AppError::InvalidInput(msg) => msg,
            AppError::DispatchFailed(_) => "Failed to send email".to_string(),
            AppError::Database(_) => "Internal server error".to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::MissingApiKey | AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
        AppError::MissingFields | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::DispatchFailed(_) | AppError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
