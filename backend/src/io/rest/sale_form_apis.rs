//! # REST API for the Sale Form
//!
//! The sale form is stateful: the client sends its current form state along
//! with each edit or submission and gets the new state back. Field flags
//! survive edits to other fields and the form is blanked after a sale is
//! recorded.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{post, MethodRouter},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use shared::{Sale, SaleFormEdit, SaleFormState};
use tracing::info;

use super::error_response;
use crate::domain::FarmError;
use crate::AppState;

/// One edit applied to the form state the client holds
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFormEditRequest {
    pub state: SaleFormState,
    pub edit: SaleFormEdit,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSubmissionResponse {
    /// Present when the sale was recorded
    pub sale: Option<Sale>,
    pub state: SaleFormState,
}

pub fn routes() -> MethodRouter<AppState> {
    post(submit_sale_form).patch(edit_sale_form)
}

pub async fn edit_sale_form(
    State(state): State<AppState>,
    Json(request): Json<SaleFormEditRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/sales/form - field: {}", request.edit.field());

    let mut form_state = request.state;
    state.farm_service.edit_sale_form(&mut form_state, request.edit);
    (StatusCode::OK, Json(form_state))
}

/// Submit the form. A rejected form comes back with its flags set and its
/// values untouched.
pub async fn submit_sale_form(
    State(state): State<AppState>,
    Json(mut form_state): Json<SaleFormState>,
) -> impl IntoResponse {
    info!("POST /api/sales/form");

    let today = Local::now().date_naive();
    match state.farm_service.submit_sale(&mut form_state, today).await {
        Ok(sale) => {
            let body = SaleSubmissionResponse {
                sale: Some(sale),
                state: form_state,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(FarmError::Validation(_)) => {
            let body = SaleSubmissionResponse {
                sale: None,
                state: form_state,
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(e) => error_response("Failed to submit sale form", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{send_json, test_router};
    use crate::storage::test_utils::TestEnvironment;
    use serde_json::json;

    #[tokio::test]
    async fn test_rejected_submission_then_edit_clears_flag() {
        let env = TestEnvironment::new().unwrap();
        let router = test_router(&env).await;

        let form = json!({
            "form": {
                "lot": "A",
                "sex": "male",
                "quantity": "5",
                "buyerId": "",
                "employeeId": "e1",
                "date": "2025-06-10",
                "isFed": true,
                "isVaccinated": false,
                "totalValue": "1000"
            }
        });

        let (status, rejected): (_, SaleSubmissionResponse) =
            send_json(&router, "POST", "/api/sales/form", Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(rejected.sale.is_none());
        assert_eq!(rejected.state.errors.invalid_fields(), vec!["buyerId"]);
        assert_eq!(rejected.state.form.quantity, "5");

        let edit = json!({
            "state": rejected.state,
            "edit": {"field": "buyerId", "value": "b1"}
        });
        let (status, edited): (_, SaleFormState) =
            send_json(&router, "PATCH", "/api/sales/form", Some(edit)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!edited.errors.has_errors());
        assert_eq!(edited.form.buyer_id, "b1");

        let (status, accepted): (_, SaleSubmissionResponse) =
            send_json(&router, "POST", "/api/sales/form", Some(json!(edited))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(accepted.sale.map(|sale| sale.quantity), Some(5));
        assert!(accepted.state.form.lot.is_empty());
    }
}
