use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::state::AppState;

/// `GET /healthcheck`: 500 while no session store is attached, otherwise
/// 200 with `ok` or `unhealthy` depending on the store's own health.
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.gateway.store.get() {
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "session store not connected",
        ),
        Some(store) if store.is_healthy() => (StatusCode::OK, "ok"),
        Some(_) => (StatusCode::OK, "unhealthy"),
    }
}
