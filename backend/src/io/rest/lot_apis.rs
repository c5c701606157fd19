//! # REST API for Lots
//!
//! Lots have no generic delete: removal goes through the in-use guard and a
//! confirmation round trip.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use shared::{Lot, LotDeletionOutcome};
use tracing::info;

use super::error_response;
use super::record_apis::{create_record, get_record, list_records, update_record};
use crate::domain::RecordForm;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteLotQuery {
    #[serde(default)]
    pub confirmed: bool,
}

pub fn router<F>() -> Router<AppState>
where
    F: RecordForm<Record = Lot> + DeserializeOwned + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_records::<Lot>).post(create_record::<F>))
        .route(
            "/:id",
            get(get_record::<Lot>).put(update_record::<F>).delete(delete_lot),
        )
}

/// Delete a lot; without `confirmed=true` only the guard runs
pub async fn delete_lot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteLotQuery>,
) -> impl IntoResponse {
    info!("DELETE /api/lots/{} - confirmed: {}", id, query.confirmed);

    match state.farm_service.delete_lot(&id, query.confirmed).await {
        Ok(outcome @ LotDeletionOutcome::ConfirmationRequired { .. }) => {
            (StatusCode::ACCEPTED, Json(outcome)).into_response()
        }
        Ok(outcome @ LotDeletionOutcome::Deleted { .. }) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_response(&format!("Failed to delete lot {}", id), e),
    }
}
