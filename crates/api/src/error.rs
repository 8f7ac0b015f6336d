use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contacthub_core::error::CoreError;
use contacthub_core::import::ImportError;
use contacthub_crm::CrmError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and upstream errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `contacthub_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An uploaded file could not be turned into contacts.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The upstream CRM call failed.
    #[error(transparent)]
    Upstream(#[from] CrmError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Contact(err) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Import errors carry every message ---
            AppError::Import(err) => {
                let errors = err.messages();
                let body = json!({
                    "error": errors.first().cloned().unwrap_or_else(|| err.to_string()),
                    "code": "IMPORT_INVALID",
                    "errors": errors,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            // --- Upstream CRM errors ---
            AppError::Upstream(err) => classify_crm_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify an upstream error into an HTTP status, error code, and message.
///
/// - A rejected credential maps to 401.
/// - An account without contact lists maps to 422.
/// - Empty or oversized batches and unusable activity ids map to 400.
/// - Everything else maps to 502 with the upstream message.
fn classify_crm_error(err: &CrmError) -> (StatusCode, &'static str, String) {
    match err {
        CrmError::Api { status: 401, .. } => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "The CRM rejected the access token".to_string(),
        ),
        CrmError::NoContactLists => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "NO_CONTACT_LISTS",
            err.to_string(),
        ),
        CrmError::EmptyBatch
        | CrmError::BatchTooLarge { .. }
        | CrmError::InvalidActivityId(_) => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
        }
        CrmError::Api { .. } | CrmError::Request(_) | CrmError::InvalidUrl { .. } => {
            tracing::error!(error = %err, "Upstream CRM error");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
    }
}
