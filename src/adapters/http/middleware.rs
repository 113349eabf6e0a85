use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{adapters::http::app_state::AppState, app_error::AppError};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Resolve `x-api-key` and attach the `ValidatedKey` for downstream handlers.
///
/// Runs before any body extractor, so key errors win over payload errors.
pub async fn api_key_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Non UTF-8 values are still "present"; they just won't match a key.
    let raw_key = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let key = app_state
        .api_key_use_cases
        .validate_api_key(raw_key.as_deref())
        .await?;

    request.extensions_mut().insert(key);

    Ok(next.run(request).await)
}
