//! # REST API for Credential Forms
//!
//! Checks the login, registration and password reset forms before the
//! client hands them to its identity provider. Nothing is stored here.

use axum::{response::Json, routing::post, Router};
use shared::{CredentialCheckResponse, LoginForm, PasswordResetForm, RegistrationForm};
use tracing::{info, warn};

use crate::domain::{validate_login, validate_password_reset, validate_registration, CredentialError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/validate", post(validate_login_form))
        .route("/registration/validate", post(validate_registration_form))
        .route("/password-reset/validate", post(validate_password_reset_form))
}

pub async fn validate_login_form(Json(form): Json<LoginForm>) -> Json<CredentialCheckResponse> {
    info!("POST /api/auth/login/validate - username: {}", form.username);
    check_response("login", validate_login(&form))
}

pub async fn validate_registration_form(
    Json(form): Json<RegistrationForm>,
) -> Json<CredentialCheckResponse> {
    info!("POST /api/auth/registration/validate - username: {}", form.username);
    check_response("registration", validate_registration(&form))
}

pub async fn validate_password_reset_form(
    Json(form): Json<PasswordResetForm>,
) -> Json<CredentialCheckResponse> {
    info!("POST /api/auth/password-reset/validate - username: {}", form.username);
    check_response("password reset", validate_password_reset(&form))
}

fn check_response(form: &str, result: Result<(), CredentialError>) -> Json<CredentialCheckResponse> {
    let response = match result {
        Ok(()) => CredentialCheckResponse {
            success: true,
            message: "OK".to_string(),
        },
        Err(e) => {
            warn!("Rejected {} form: {}", form, e);
            CredentialCheckResponse {
                success: false,
                message: e.to_string(),
            }
        }
    };
    Json(response)
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send_json, test_router};
    use crate::storage::test_utils::TestEnvironment;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::CredentialCheckResponse;

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let env = TestEnvironment::new().unwrap();
        let router = test_router(&env).await;

        let (status, body): (_, CredentialCheckResponse) = send_json(
            &router,
            "POST",
            "/api/auth/login/validate",
            Some(json!({"username": "rancher", "password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert_eq!(body.message, "Please fill in all fields");

        let (_, body): (_, CredentialCheckResponse) = send_json(
            &router,
            "POST",
            "/api/auth/login/validate",
            Some(json!({"username": "rancher", "password": "secret"})),
        )
        .await;
        assert!(body.success);
    }

    #[tokio::test]
    async fn test_registration_reports_short_password() {
        let env = TestEnvironment::new().unwrap();
        let router = test_router(&env).await;

        let (_, body): (_, CredentialCheckResponse) = send_json(
            &router,
            "POST",
            "/api/auth/registration/validate",
            Some(json!({
                "name": "Ana",
                "email": "ana@farm.test",
                "username": "ana",
                "password": "12345",
                "confirmPassword": "12345"
            })),
        )
        .await;
        assert!(!body.success);
        assert_eq!(body.message, "Password must be at least 6 characters long");
    }

    #[tokio::test]
    async fn test_password_reset_reports_mismatch() {
        let env = TestEnvironment::new().unwrap();
        let router = test_router(&env).await;

        let (_, body): (_, CredentialCheckResponse) = send_json(
            &router,
            "POST",
            "/api/auth/password-reset/validate",
            Some(json!({"username": "ana", "newPassword": "abcdef", "confirmPassword": "abcdeg"})),
        )
        .await;
        assert!(!body.success);
        assert_eq!(body.message, "Passwords do not match");
    }
}
