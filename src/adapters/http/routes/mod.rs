pub mod v1;

use axum::{Router, middleware};

use crate::adapters::http::{app_state::AppState, middleware::api_key_auth};

pub fn router(app_state: AppState) -> Router<AppState> {
    let authenticated =
        v1::authenticated_router().route_layer(middleware::from_fn_with_state(app_state, api_key_auth));

    Router::new().nest("/v1", authenticated.merge(v1::public_router()))
}
