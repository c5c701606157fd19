//! # REST API Interface Layer
//!
//! All routes live under `/api`:
//!
//! - `POST|DELETE /session`
//! - `POST /auth/{login,registration,password-reset}/validate`
//! - `GET|POST /{cattle,buyers,supplies,employees,sales}`, `GET|PUT|DELETE .../:id`
//! - `GET|POST /lots`, `GET|PUT /lots/:id`, `DELETE /lots/:id?confirmed=`
//! - `PUT|DELETE /cattle/filter`, `PUT|DELETE /sales/filter`
//! - `POST|PATCH /sales/form` for the stateful sale form
//! - `GET /dashboard`, `GET /reports`, `GET /reports/export`
//! - `GET /sync`, `POST /sync/retry`

pub mod auth_apis;
pub mod filter_apis;
pub mod lot_apis;
pub mod record_apis;
pub mod report_apis;
pub mod sale_form_apis;
pub mod session_apis;
pub mod sync_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use shared::{
    Buyer, BuyerForm, Cattle, CattleForm, Employee, EmployeeForm, LotForm, LotInUseResponse,
    Sale, SaleForm, Supply, SupplyForm, ValidationFailureResponse,
};
use tracing::{error, warn};

use crate::domain::FarmError;
use crate::AppState;

/// Router for every API endpoint, to be nested under `/api`
pub fn api_router() -> Router<AppState> {
    let cattle = Router::new()
        .route(
            "/",
            get(filter_apis::cattle_view).post(record_apis::create_record::<CattleForm>),
        )
        .route(
            "/filter",
            put(filter_apis::apply_cattle_filter).delete(filter_apis::clear_cattle_filter),
        )
        .route(
            "/:id",
            get(record_apis::get_record::<Cattle>)
                .put(record_apis::update_record::<CattleForm>)
                .delete(record_apis::delete_record::<Cattle>),
        );

    let sales = Router::new()
        .route(
            "/",
            get(filter_apis::sales_view).post(record_apis::create_record::<SaleForm>),
        )
        .route(
            "/filter",
            put(filter_apis::apply_sales_filter).delete(filter_apis::clear_sales_filter),
        )
        .route("/form", sale_form_apis::routes())
        .route(
            "/:id",
            get(record_apis::get_record::<Sale>)
                .put(record_apis::update_record::<SaleForm>)
                .delete(record_apis::delete_record::<Sale>),
        );

    Router::new()
        .nest("/session", session_apis::router())
        .nest("/auth", auth_apis::router())
        .nest("/cattle", cattle)
        .nest("/sales", sales)
        .nest("/buyers", record_apis::router::<BuyerForm, Buyer>())
        .nest("/supplies", record_apis::router::<SupplyForm, Supply>())
        .nest("/employees", record_apis::router::<EmployeeForm, Employee>())
        .nest("/lots", lot_apis::router::<LotForm>())
        .merge(report_apis::router())
        .nest("/sync", sync_apis::router())
}

/// Translate a domain error into a response, logging it on the way
pub fn error_response(context: &str, error: FarmError) -> Response {
    let message = error.to_string();

    match error {
        FarmError::Validation(errors) => {
            warn!("{}: {} ({:?})", context, message, errors.invalid_fields());
            let body = ValidationFailureResponse { message, errors };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        FarmError::EmptyFilter => {
            warn!("{}: {}", context, message);
            (StatusCode::BAD_REQUEST, message).into_response()
        }
        FarmError::LotInUse { lot, count } => {
            warn!("{}: {}", context, message);
            let body = LotInUseResponse { message, lot, count };
            (StatusCode::CONFLICT, Json(body)).into_response()
        }
        FarmError::NotFound { .. } => {
            warn!("{}: {}", context, message);
            (StatusCode::NOT_FOUND, message).into_response()
        }
        FarmError::NoSession => (StatusCode::UNAUTHORIZED, message).into_response(),
        FarmError::Persistence(e) => {
            error!("{}: {:#}", context, e);
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}
