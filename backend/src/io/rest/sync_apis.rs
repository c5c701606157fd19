//! # REST API for Sync Status
//!
//! Reports collections whose last save failed and retries them on request.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::SyncStatusResponse;
use tracing::info;

use super::error_response;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_sync_status))
        .route("/retry", post(retry_sync))
}

pub async fn get_sync_status(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/sync");

    let pending = state.farm_service.pending_sync().await;
    (StatusCode::OK, Json(SyncStatusResponse { pending }))
}

pub async fn retry_sync(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/sync/retry");

    match state.farm_service.retry_pending_sync().await {
        Ok(pending) => (StatusCode::OK, Json(SyncStatusResponse { pending })).into_response(),
        Err(e) => error_response("Failed to retry sync", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, send_json, test_router};
    use crate::storage::test_utils::TestEnvironment;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::{CollectionKind, SyncStatusResponse};

    #[tokio::test]
    async fn test_failed_save_is_reported_and_retried() {
        let env = TestEnvironment::new().unwrap();
        let router = test_router(&env).await;

        env.store.set_fail_saves(true);
        let (status, _) = send(&router, "POST", "/api/employees", Some(json!({"name": "Ana"}))).await;
        // The change stands even though storage is down
        assert_eq!(status, StatusCode::CREATED);

        let (_, sync): (_, SyncStatusResponse) = send_json(&router, "GET", "/api/sync", None).await;
        assert_eq!(sync.pending, vec![CollectionKind::Employees]);

        env.store.set_fail_saves(false);
        let (status, sync): (_, SyncStatusResponse) = send_json(&router, "POST", "/api/sync/retry", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(sync.pending.is_empty());
    }
}
