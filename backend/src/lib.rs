//! # RuralTech Backend
//!
//! Farm-management core: cattle, buyers, supplies, employees, sales and lots
//! for a signed-in user, with dashboard and report aggregation.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (validation, aggregation, FarmService)
//!     ↓
//! Storage Layer (local JSON files or per-user SQLite rows)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Build the configured storage backend and the farm service on top of it
//! - Set up the REST router with CORS

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{CsvReportRenderer, FarmService, LogNotifier, ReportRenderer};
use crate::storage::{
    CollectionStorage, DbConnection, FarmRepository, JsonFileStore, SqliteCollectionStore,
    UserSession,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub farm_service: FarmService,
    pub report_renderer: Arc<dyn ReportRenderer>,
}

/// Build the storage backend named in `config` and the services over it
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let session = UserSession::new();

    let storage: Arc<dyn CollectionStorage> = match config.storage {
        StorageBackend::Local => {
            let store = JsonFileStore::new(&config.data_directory)?;
            info!("Using local storage in {:?}", store.base_directory());
            Arc::new(store)
        }
        StorageBackend::Remote => {
            info!("Using remote storage at {}", config.database_url);
            let connection = DbConnection::new(&config.database_url).await?;
            Arc::new(SqliteCollectionStore::new(connection, Arc::new(session.clone())))
        }
    };

    info!("Setting up domain model");
    let farm_service = FarmService::new(
        FarmRepository::new(storage),
        session,
        Arc::new(LogNotifier),
    );

    Ok(AppState {
        farm_service,
        report_renderer: Arc::new(CsvReportRenderer::new()),
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    Router::new()
        .nest("/api", io::api_router())
        .layer(cors)
        .with_state(app_state)
}
