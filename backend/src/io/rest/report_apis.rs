//! # REST API for the Dashboard and Reports
//!
//! All figures are recomputed from the current collections on every request,
//! with the server's local date as the reference month.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Local;
use tracing::{error, info};

use super::error_response;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/reports", get(get_report))
        .route("/reports/export", get(export_report))
}

pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard");

    match state.farm_service.dashboard(Local::now().date_naive()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response("Failed to build dashboard", e),
    }
}

pub async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports");

    match state.farm_service.farm_report(Local::now().date_naive()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response("Failed to build report", e),
    }
}

/// Rendered report as a downloadable document
pub async fn export_report(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/export");

    let today = Local::now().date_naive();
    let report = match state.farm_service.farm_report(today).await {
        Ok(report) => report,
        Err(e) => return error_response("Failed to build report for export", e),
    };

    match state.report_renderer.render(&report) {
        Ok(document) => {
            let headers = [
                (header::CONTENT_TYPE, state.report_renderer.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"ruraltech-report-{}.csv\"", today),
                ),
            ];
            (StatusCode::OK, headers, document).into_response()
        }
        Err(e) => {
            error!("Failed to render report: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering report").into_response()
        }
    }
}
