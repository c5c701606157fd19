//! # REST API for Date-Filtered Views
//!
//! The cattle and sales lists each keep their own day/month/year filter.
//! `GET` on the collection returns the filtered view while a filter is active.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::DatePattern;
use tracing::info;

use super::error_response;
use crate::AppState;

pub async fn cattle_view(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/cattle");

    match state.farm_service.cattle_view().await {
        Ok(cattle) => (StatusCode::OK, Json(cattle)).into_response(),
        Err(e) => error_response("Failed to list cattle", e),
    }
}

pub async fn apply_cattle_filter(
    State(state): State<AppState>,
    Json(pattern): Json<DatePattern>,
) -> impl IntoResponse {
    info!("PUT /api/cattle/filter - pattern: {:?}", pattern);

    match state.farm_service.apply_cattle_filter(pattern).await {
        Ok(cattle) => (StatusCode::OK, Json(cattle)).into_response(),
        Err(e) => error_response("Failed to filter cattle", e),
    }
}

pub async fn clear_cattle_filter(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/cattle/filter");

    match state.farm_service.clear_cattle_filter().await {
        Ok(cattle) => (StatusCode::OK, Json(cattle)).into_response(),
        Err(e) => error_response("Failed to clear cattle filter", e),
    }
}

pub async fn sales_view(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/sales");

    match state.farm_service.sales_view().await {
        Ok(sales) => (StatusCode::OK, Json(sales)).into_response(),
        Err(e) => error_response("Failed to list sales", e),
    }
}

pub async fn apply_sales_filter(
    State(state): State<AppState>,
    Json(pattern): Json<DatePattern>,
) -> impl IntoResponse {
    info!("PUT /api/sales/filter - pattern: {:?}", pattern);

    match state.farm_service.apply_sales_filter(pattern).await {
        Ok(sales) => (StatusCode::OK, Json(sales)).into_response(),
        Err(e) => error_response("Failed to filter sales", e),
    }
}

pub async fn clear_sales_filter(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/sales/filter");

    match state.farm_service.clear_sales_filter().await {
        Ok(sales) => (StatusCode::OK, Json(sales)).into_response(),
        Err(e) => error_response("Failed to clear sales filter", e),
    }
}
