//! # REST API for the User Session
//!
//! Signing in loads every collection of the user; signing out drops them.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use shared::StartSessionRequest;
use tracing::{info, warn};

use super::error_response;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(start_session).delete(end_session))
}

pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/session - user: {}", request.user_id);

    if request.user_id.trim().is_empty() {
        warn!("Rejected session start without a user id");
        return (StatusCode::BAD_REQUEST, "userId is required").into_response();
    }

    match state.farm_service.start_session(request.user_id.trim()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to start session", e),
    }
}

pub async fn end_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/session");
    state.farm_service.end_session().await;
    StatusCode::NO_CONTENT
}
