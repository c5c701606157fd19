//! # REST API for Record Collections
//!
//! Generic create, list, update and delete handlers shared by every
//! collection. Each collection instantiates them with its form and record type.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::de::DeserializeOwned;
use shared::FarmRecord;
use tracing::info;

use super::error_response;
use crate::domain::{CollectionSlot, FreelyDeletable, RecordForm};
use crate::AppState;

/// Full CRUD router for a collection without a deletion guard
pub fn router<F, T>() -> Router<AppState>
where
    F: RecordForm<Record = T> + DeserializeOwned + Send + Sync + 'static,
    T: FreelyDeletable,
{
    Router::new()
        .route("/", get(list_records::<T>).post(create_record::<F>))
        .route(
            "/:id",
            get(get_record::<T>).put(update_record::<F>).delete(delete_record::<T>),
        )
}

/// List every record of the collection in insertion order
pub async fn list_records<T: CollectionSlot>(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET {}", T::KIND);

    match state.farm_service.list::<T>().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response(&format!("Failed to list {}", T::KIND), e),
    }
}

pub async fn get_record<T: CollectionSlot>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET {}/{}", T::KIND, id);

    match state.farm_service.get::<T>(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&format!("Failed to get {} record {}", T::KIND, id), e),
    }
}

/// Validate the form and append a new record
pub async fn create_record<F>(State(state): State<AppState>, Json(form): Json<F>) -> impl IntoResponse
where
    F: RecordForm + DeserializeOwned + Send + Sync + 'static,
    F::Record: CollectionSlot,
{
    let kind = <F::Record as FarmRecord>::KIND;
    info!("POST {}", kind);

    match state.farm_service.create(&form).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(&format!("Failed to create {} record", kind), e),
    }
}

/// Replace every field of an existing record
pub async fn update_record<F>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<F>,
) -> impl IntoResponse
where
    F: RecordForm + DeserializeOwned + Send + Sync + 'static,
    F::Record: CollectionSlot,
{
    let kind = <F::Record as FarmRecord>::KIND;
    info!("PUT {}/{}", kind, id);

    match state.farm_service.update(&id, &form).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&format!("Failed to update {} record {}", kind, id), e),
    }
}

pub async fn delete_record<T: FreelyDeletable>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE {}/{}", T::KIND, id);

    match state.farm_service.delete::<T>(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&format!("Failed to delete {} record {}", T::KIND, id), e),
    }
}
